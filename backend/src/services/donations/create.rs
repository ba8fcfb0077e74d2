//! # Donation Creation Service
//!
//! Provides `POST /api/donations`. The request is `multipart/form-data` with:
//! - a `json` part holding a `NewDonation` (quantity, shelf life, location,
//!   optional receiver id);
//! - an optional `picture` part with an image file.
//!
//! The payload is validated before anything touches the disk. The donation is
//! written first (status `pending`, no volunteer requested) and the picture is
//! stored under its MD5 digest afterwards; if that write fails the donation is
//! removed again. Each part may appear at most once.

use super::picture::{self, Picture};
use crate::auth::ActingUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::validation;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::requests::NewDonation;
use futures_util::StreamExt;
use log::warn;
use md5::Context;

const MSG: &str = "Error creating donation";
const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// Parts collected from the multipart body.
#[derive(Default)]
struct Upload {
    donation: Option<NewDonation>,
    picture: Option<Picture>,
}

/// `POST /api/donations` on behalf of the acting donor. Answers 201 with the saved donation.
pub async fn process(
    ledger: web::Data<LedgerState>,
    config: web::Data<Config>,
    donor: ActingUser,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload).await?;
    let new_donation = upload
        .donation
        .ok_or_else(|| ApiError::payload(MSG, "missing `json` part"))?;

    let picture = upload.picture;
    let draft = validation::new_donation(donor.id(), &new_donation, picture.as_ref().map(Picture::url))
        .map_err(ApiError::ledger(MSG))?;

    let saved = ledger
        .run(move |l| l.create_donation(draft))
        .await
        .map_err(ApiError::ledger(MSG))?;

    if let Some(picture) = picture {
        if let Err(err) = picture::store(&config.upload_dir, picture).await {
            let id = saved.id;
            if let Err(cleanup) = ledger.run(move |l| l.delete_donation(id)).await {
                warn!("donation {id} kept without its picture: {cleanup}");
            }
            return Err(err);
        }
    }

    Ok(HttpResponse::Created().json(serde_json::json!({
        "msg": "Donation request sent successfully",
        "savedDonation": saved,
    })))
}

async fn read_upload(mut payload: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::payload(MSG, e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("json") => {
                if upload.donation.is_some() {
                    return Err(ApiError::payload(MSG, "duplicate `json` part"));
                }
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| ApiError::payload(MSG, e.to_string()))?;
                    bytes.extend_from_slice(&chunk);
                }
                let donation: NewDonation = serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::payload(MSG, format!("invalid `json` part: {e}")))?;
                upload.donation = Some(donation);
            }

            Some("picture") => {
                if upload.picture.is_some() {
                    return Err(ApiError::payload(MSG, "duplicate `picture` part"));
                }
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let extension = picture::image_extension(&filename)?;

                let mut hasher = Context::new();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| ApiError::payload(MSG, e.to_string()))?;
                    if bytes.len() + chunk.len() > MAX_PICTURE_BYTES {
                        return Err(ApiError::payload(
                            MSG,
                            format!("picture exceeds {MAX_PICTURE_BYTES} bytes"),
                        ));
                    }
                    hasher.consume(&chunk);
                    bytes.extend_from_slice(&chunk);
                }
                if bytes.is_empty() {
                    return Err(ApiError::payload(MSG, "picture is empty"));
                }

                upload.picture = Some(Picture {
                    extension,
                    digest: format!("{:x}", hasher.finalize()),
                    bytes,
                });
            }

            _ => {}
        }
    }

    Ok(upload)
}

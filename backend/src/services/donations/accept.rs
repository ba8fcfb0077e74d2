//! # Donation Acceptance Service
//!
//! `PUT /api/donations/{id}/accept` with `{ "volunteer": bool, "requestId"?: uuid }`.
//!
//! The acting user is the receiver. The donation moves to `assigning_volunteer`
//! when both the donor flagged it and the receiver asks for a volunteer, and to
//! `self_pickup` otherwise. In the same transaction the donation's quantity is
//! taken off the paired request (the given `requestId`, or else the receiver's
//! oldest active request).

use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::services::path_id;
use crate::validation;
use actix_web::{web, HttpResponse};
use common::requests::AcceptDonationRequest;

const MSG: &str = "Error accepting donation";

/// Accepts the donation for the acting receiver and reconciles the paired request.
pub async fn process(
    ledger: web::Data<LedgerState>,
    receiver: ActingUser,
    id: web::Path<String>,
    payload: web::Json<AcceptDonationRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path_id(&id, "donation id", MSG)?;
    let payload = payload.into_inner();
    let request_id = validation::parse_optional_id(payload.request_id.as_deref(), "requestId")
        .map_err(ApiError::ledger(MSG))?;
    let receiver_id = receiver.id();

    let (donation, reconciliation) = ledger
        .run(move |l| l.accept_donation(id, receiver_id, payload.volunteer, request_id))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Donation updated successfully",
        "updatedDonation": donation,
        "reconciliation": reconciliation,
    })))
}

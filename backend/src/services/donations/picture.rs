//! Storage of donation pictures.
//!
//! Pictures are written to the configured upload directory under the MD5
//! digest of their bytes, so uploading the same image twice yields one file.
//! They are served back by the `/images` file service registered in `lib.rs`.

use crate::error::ApiError;
use actix_web::web;
use mime_guess::mime;
use std::fs;
use std::path::{Path, PathBuf};

const MSG: &str = "Error storing picture";

/// A fully received picture upload.
pub struct Picture {
    pub extension: String,
    pub digest: String,
    pub bytes: Vec<u8>,
}

impl Picture {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.digest, self.extension)
    }

    /// Where the picture is served once stored.
    pub fn url(&self) -> String {
        format!("/images/{}", self.file_name())
    }
}

/// Lower-cased extension of `filename`, provided it names an image type.
pub fn image_extension(filename: &str) -> Result<String, ApiError> {
    let is_image = mime_guess::from_path(filename)
        .first()
        .is_some_and(|m| m.type_() == mime::IMAGE);
    if !is_image {
        return Err(ApiError::payload(
            "Error creating donation",
            format!("'{filename}' is not an image"),
        ));
    }

    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            ApiError::payload("Error creating donation", "picture has no file extension")
        })
}

/// Writes the picture under `dir`, named by [`Picture::file_name`].
pub async fn store(dir: &Path, picture: Picture) -> Result<(), ApiError> {
    let dir: PathBuf = dir.to_path_buf();
    let path = dir.join(picture.file_name());

    web::block(move || {
        fs::create_dir_all(&dir)?;
        fs::write(&path, &picture.bytes)
    })
    .await
    .map_err(|e| ApiError::Io {
        msg: MSG,
        source: std::io::Error::other(e.to_string()),
    })?
    .map_err(|source| ApiError::Io { msg: MSG, source })
}

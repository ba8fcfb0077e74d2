//! Error kinds of the backend and their HTTP mapping.
//!
//! `LedgerError` is what the ledger worker and the validation layer produce.
//! `ApiError` is what handlers return: it carries the human-readable `msg` of
//! the failed action and renders as `{ "msg": ..., "error": ... }`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::donation::DonationStatus;
use log::{error, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("cannot move donation from '{from}' to '{to}'")]
    InvalidTransition {
        from: DonationStatus,
        to: DonationStatus,
    },

    #[error("{0} was modified by another writer, retry the action")]
    Conflict(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("ledger worker is not running")]
    WorkerGone,
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::InvalidTransition { .. } | LedgerError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::Storage(_) | LedgerError::WorkerGone => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{msg}: {source}")]
    Ledger {
        msg: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("missing or malformed X-User-Id header")]
    Unauthenticated,

    #[error("{msg}: {detail}")]
    Payload { msg: &'static str, detail: String },

    #[error("{msg}: {source}")]
    Io {
        msg: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Wraps a ledger failure with the message of the action that failed.
    ///
    /// Meant for `map_err`: `.map_err(ApiError::ledger("Error accepting donation"))`.
    pub fn ledger(msg: &'static str) -> impl FnOnce(LedgerError) -> ApiError {
        move |source| ApiError::Ledger { msg, source }
    }

    pub fn payload(msg: &'static str, detail: impl Into<String>) -> Self {
        ApiError::Payload {
            msg,
            detail: detail.into(),
        }
    }

    fn msg(&self) -> String {
        match self {
            // Not-found messages already name the missing entity.
            ApiError::Ledger {
                source: source @ LedgerError::NotFound(_),
                ..
            } => source.to_string(),
            ApiError::Ledger { msg, .. } | ApiError::Payload { msg, .. } | ApiError::Io { msg, .. } => {
                msg.to_string()
            }
            ApiError::Unauthenticated => "Unauthorized".to_string(),
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Ledger { source, .. } => source.to_string(),
            ApiError::Payload { detail, .. } => detail.clone(),
            ApiError::Io { source, .. } => source.to_string(),
            ApiError::Unauthenticated => self.to_string(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(source: LedgerError) -> Self {
        ApiError::Ledger {
            msg: "Request failed",
            source,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger { source, .. } => source.status_code(),
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Payload { .. } => StatusCode::BAD_REQUEST,
            ApiError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{} ({})", self, status);
        }
        HttpResponse::build(status).json(serde_json::json!({
            "msg": self.msg(),
            "error": self.detail(),
        }))
    }
}

//! HTTP surface of the backend, one sub-module per resource.
//!
//! Every handler answers `{ "msg": ..., <payload> }` on success; failures are
//! rendered by `ApiError` as `{ "msg": ..., "error": ... }`.

pub mod donations;
pub mod requests;

use crate::error::ApiError;
use crate::validation;
use uuid::Uuid;

/// Parses an id taken from the URL path; a malformed one is a 400 under `msg`.
pub(crate) fn path_id(raw: &str, field: &str, msg: &'static str) -> Result<Uuid, ApiError> {
    validation::parse_id(raw, field).map_err(ApiError::ledger(msg))
}

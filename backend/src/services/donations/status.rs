//! Status changes that need nothing but the donation id (and, for `update`,
//! the target status).
//!
//! `update` is checked against the transition matrix; `self_volunteer` and
//! `confirm_pickup` force their state; `need_volunteer` only sets the flag.

use crate::error::{ApiError, LedgerError};
use crate::ledger::{Ledger, LedgerState};
use crate::services::path_id;
use crate::validation;
use actix_web::{web, HttpResponse};
use common::model::donation::Donation;
use common::requests::UpdateStatusRequest;
use uuid::Uuid;

async fn apply<F>(
    ledger: &LedgerState,
    raw_id: &str,
    error_msg: &'static str,
    success_msg: &'static str,
    op: F,
) -> Result<HttpResponse, ApiError>
where
    F: FnOnce(&mut Ledger, Uuid) -> Result<Donation, LedgerError> + Send + 'static,
{
    let id = path_id(raw_id, "donation id", error_msg)?;
    let donation = ledger
        .run(move |l| op(l, id))
        .await
        .map_err(ApiError::ledger(error_msg))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": success_msg,
        "donation": donation,
    })))
}

/// `PUT /api/donations/{id}/status` with `{ "status": "<name>" }`.
pub async fn update(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    const MSG: &str = "Error updating donation status";
    let status = validation::status(&payload.status).map_err(ApiError::ledger(MSG))?;
    apply(&ledger, &id, MSG, "Donation status updated", move |l, id| {
        l.update_status(id, status)
    })
    .await
}

/// `PUT /api/donations/{id}/self-volunteer`: the donor delivers; forces `pickbydonor`.
pub async fn self_volunteer(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    apply(
        &ledger,
        &id,
        "Error updating donation status",
        "Donation status updated to pickbydonor",
        |l, id| l.mark_self_volunteer(id),
    )
    .await
}

/// `PUT /api/donations/{id}/confirm-pickup`: forces `completed`.
pub async fn confirm_pickup(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    apply(
        &ledger,
        &id,
        "Error confirming pickup",
        "Donation status marked as completed",
        |l, id| l.confirm_pickup(id),
    )
    .await
}

/// `PUT /api/donations/{id}/need-volunteer`: the donor asks for a volunteer; status is unchanged.
pub async fn need_volunteer(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    apply(
        &ledger,
        &id,
        "Error updating needVolunteer",
        "Donation marked as needing volunteer",
        |l, id| l.request_volunteer(id),
    )
    .await
}

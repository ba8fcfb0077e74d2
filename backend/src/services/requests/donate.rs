//! `POST /api/requests/{id}/donate` with `{ "quantityDonated": number }`.
//!
//! The quantity is taken off the request; once nothing is left the request is
//! zeroed and marked inactive but kept, so it can still be fetched by id.

use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::services::path_id;
use actix_web::{web, HttpResponse};
use common::requests::DonateRequest;

const MSG: &str = "Error updating request";

/// Applies `quantityDonated` to the request and reports what is left.
pub async fn process(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
    payload: web::Json<DonateRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path_id(&id, "request id", MSG)?;
    let donated = payload.quantity_donated;

    let outcome = ledger
        .run(move |l| l.reconcile(id, donated))
        .await
        .map_err(ApiError::ledger(MSG))?;

    let msg = if outcome.request_closed {
        "Donation fully completed, request closed"
    } else {
        "Donation successfully added"
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": msg,
        "remainingQuantity": outcome.remaining_quantity,
        "requestClosed": outcome.request_closed,
    })))
}

use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::services::path_id;
use actix_web::{web, HttpResponse};

const MSG: &str = "Error fetching donation";

/// `GET /api/donations/{id}`: a single donation, whatever its status.
///
/// Answers 400 for a malformed id and 404 when no donation has it.
pub async fn process(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path_id(&id, "donation id", MSG)?;
    let donation = ledger
        .run(move |l| l.donation(id))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Donation fetched successfully",
        "donation": donation,
    })))
}

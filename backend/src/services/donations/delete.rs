use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::services::path_id;
use actix_web::{web, HttpResponse};

const MSG: &str = "Error deleting donation";

/// `DELETE /api/donations/{id}`: removes the donation and returns it.
pub async fn process(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path_id(&id, "donation id", MSG)?;
    let deleted = ledger
        .run(move |l| l.delete_donation(id))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Donation deleted successfully",
        "deletedDonation": deleted,
    })))
}

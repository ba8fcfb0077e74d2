use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::services::path_id;
use actix_web::{web, HttpResponse};

const MSG: &str = "Error fetching request";

/// `GET /api/requests/{id}`: a single request; closed ones are still returned.
pub async fn process(
    ledger: web::Data<LedgerState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path_id(&id, "request id", MSG)?;
    let request = ledger
        .run(move |l| l.request(id))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Request fetched successfully",
        "request": request,
    })))
}

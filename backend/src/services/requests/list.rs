use crate::error::ApiError;
use crate::ledger::LedgerState;
use actix_web::{web, HttpResponse};

/// `GET /api/requests`: every request still waiting for food, oldest first.
pub async fn process(ledger: web::Data<LedgerState>) -> Result<HttpResponse, ApiError> {
    let requests = ledger
        .run(|l| l.active_requests())
        .await
        .map_err(ApiError::ledger("Error fetching requests"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Active requests fetched",
        "requests": requests,
    })))
}

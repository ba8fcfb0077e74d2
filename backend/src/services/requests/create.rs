use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::validation;
use actix_web::{web, HttpResponse};
use common::requests::NewReceiverRequest;

const MSG: &str = "Error creating request";

/// `POST /api/requests`: opens a request for the acting receiver.
///
/// # Arguments
/// * `receiver` - the user from `X-User-Id`, recorded as the request's owner.
/// * `payload` - contact details, delivery location and the quantity needed.
///
/// # Returns
/// 201 with the saved request, which starts active with `version` 0.
pub async fn process(
    ledger: web::Data<LedgerState>,
    receiver: ActingUser,
    payload: web::Json<NewReceiverRequest>,
) -> Result<HttpResponse, ApiError> {
    let draft = validation::new_request(receiver.id(), &payload).map_err(ApiError::ledger(MSG))?;
    let saved = ledger
        .run(move |l| l.create_request(draft))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "msg": "Request created successfully",
        "savedRequest": saved,
    })))
}

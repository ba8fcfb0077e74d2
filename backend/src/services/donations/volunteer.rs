use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::services::path_id;
use actix_web::{web, HttpResponse};

const MSG: &str = "Error assigning volunteer";

/// `PUT /api/donations/{id}/assign-volunteer`: the acting user takes the delivery.
pub async fn process(
    ledger: web::Data<LedgerState>,
    volunteer: ActingUser,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path_id(&id, "donation id", MSG)?;
    let volunteer_id = volunteer.id();
    let donation = ledger
        .run(move |l| l.assign_volunteer(id, volunteer_id))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Volunteer assigned successfully",
        "updatedDonation": donation,
    })))
}

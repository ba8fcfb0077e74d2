use crate::auth::ActingUser;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use actix_web::{web, HttpResponse};

const MSG: &str = "Error fetching donor donations";

/// `GET /api/donations/donor`: the acting donor's donations a receiver has
/// decided on (accepted, self pickup or rejected).
///
/// A donor with no donations at all gets a 404; one whose donations are all
/// still undecided gets an empty list.
pub async fn process(
    ledger: web::Data<LedgerState>,
    donor: ActingUser,
) -> Result<HttpResponse, ApiError> {
    let donor_id = donor.id();
    let history = ledger
        .run(move |l| l.donor_history(donor_id))
        .await
        .map_err(ApiError::ledger(MSG))?;

    let msg = if history.decided.is_empty() {
        "No donations with the required status found"
    } else {
        "Fetched Donations with required status"
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": msg,
        "donations": history.decided,
    })))
}

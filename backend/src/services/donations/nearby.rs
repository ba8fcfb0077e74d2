use crate::config::Config;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use crate::validation;
use actix_web::{web, HttpResponse};
use common::requests::NearbyDonationsRequest;

const MSG: &str = "Error fetching donations";

/// `POST /api/donations/nearby`: accepted donations around `{lat, long}`,
/// nearest first, within `Config::nearby_radius_meters`.
pub async fn process(
    ledger: web::Data<LedgerState>,
    config: web::Data<Config>,
    payload: web::Json<NearbyDonationsRequest>,
) -> Result<HttpResponse, ApiError> {
    let origin = validation::query_point(payload.lat, payload.long).map_err(ApiError::ledger(MSG))?;
    let radius = config.nearby_radius_meters;

    let donations = ledger
        .run(move |l| l.nearby_donations(origin, radius))
        .await
        .map_err(ApiError::ledger(MSG))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": format!("Found {} donations within {} m", donations.len(), radius),
        "donations": donations,
    })))
}

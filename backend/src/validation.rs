//! Input checks shared by every handler.
//!
//! Everything here returns `LedgerError::Validation`, which the API renders as
//! a 400. Lookups that fail because an entity does not exist are reported by
//! the ledger itself as `NotFound`, never from this module.

use crate::error::LedgerError;
use common::model::donation::DonationStatus;
use common::model::location::{GeoPoint, Location, ReceiverLocation};
use common::requests::{NewDonation, NewReceiverRequest};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").expect("phone regex"));

/// A donation that passed validation and is ready to be written.
#[derive(Debug, Clone)]
pub struct DonationDraft {
    pub donor_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub quantity: f64,
    pub shelf_life: String,
    pub location: Location,
    pub picture_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub receiver_id: Uuid,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub receiver_location: ReceiverLocation,
    pub quantity: f64,
}

/// Parses an identifier; `field` names it in the error (`Invalid receiverId`).
pub fn parse_id(raw: &str, field: &str) -> Result<Uuid, LedgerError> {
    Uuid::parse_str(raw.trim()).map_err(|_| LedgerError::validation(format!("Invalid {field}")))
}

/// Like [`parse_id`], but a missing or blank value means "not provided".
pub fn parse_optional_id(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, LedgerError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(value, field).map(Some),
    }
}

pub fn positive_quantity(value: f64, field: &str) -> Result<f64, LedgerError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LedgerError::validation(format!(
            "{field} must be a number greater than zero"
        )))
    }
}

pub fn required_text(value: &str, field: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(LedgerError::validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn phone(value: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if PHONE_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(LedgerError::validation("Invalid receiverPhone"))
    }
}

fn latitude(value: f64) -> Result<f64, LedgerError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(value)
    } else {
        Err(LedgerError::validation("lat must be between -90 and 90"))
    }
}

fn longitude(value: f64) -> Result<f64, LedgerError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(value)
    } else {
        Err(LedgerError::validation("long must be between -180 and 180"))
    }
}

/// The point a proximity lookup is centred on. Both coordinates are mandatory.
pub fn query_point(lat: Option<f64>, long: Option<f64>) -> Result<GeoPoint, LedgerError> {
    match (lat, long) {
        (Some(lat), Some(long)) => Ok(GeoPoint {
            lat: latitude(lat)?,
            long: longitude(long)?,
        }),
        _ => Err(LedgerError::validation(
            "Current location (lat and long) is required",
        )),
    }
}

/// Coordinates on a donation are optional, but the ones present must be in range.
pub fn donation_location(location: &Location) -> Result<Location, LedgerError> {
    Ok(Location {
        name: required_text(&location.name, "location.name")?,
        lat: location.lat.map(latitude).transpose()?,
        long: location.long.map(longitude).transpose()?,
    })
}

pub fn receiver_location(location: &ReceiverLocation) -> Result<ReceiverLocation, LedgerError> {
    Ok(ReceiverLocation {
        name: required_text(&location.name, "receiverLocation.name")?,
        lat: latitude(location.lat)?,
        long: longitude(location.long)?,
    })
}

pub fn status(raw: &str) -> Result<DonationStatus, LedgerError> {
    raw.trim()
        .parse()
        .map_err(|e: common::model::donation::UnknownStatus| LedgerError::validation(e.to_string()))
}

pub fn new_donation(
    donor_id: Uuid,
    payload: &NewDonation,
    picture_url: Option<String>,
) -> Result<DonationDraft, LedgerError> {
    Ok(DonationDraft {
        donor_id,
        receiver_id: parse_optional_id(payload.receiver_id.as_deref(), "receiverId")?,
        quantity: positive_quantity(payload.quantity, "quantity")?,
        shelf_life: required_text(&payload.shelf_life, "shelfLife")?,
        location: donation_location(&payload.location)?,
        picture_url,
    })
}

pub fn new_request(
    receiver_id: Uuid,
    payload: &NewReceiverRequest,
) -> Result<RequestDraft, LedgerError> {
    Ok(RequestDraft {
        receiver_id,
        receiver_name: required_text(&payload.receiver_name, "receiverName")?,
        receiver_phone: phone(&payload.receiver_phone)?,
        receiver_address: required_text(&payload.receiver_address, "receiverAddress")?,
        receiver_location: receiver_location(&payload.receiver_location)?,
        quantity: positive_quantity(payload.quantity, "quantity")?,
    })
}

use crate::model::location::{Location, ReceiverLocation};
use serde::Deserialize;

/// The `json` part of a `POST /api/donations` multipart upload.
///
/// `receiverId` is kept as a string so that a malformed id is reported as a
/// validation error rather than a generic payload error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub quantity: f64,
    pub shelf_life: String,
    pub location: Location,
    #[serde(default)]
    pub receiver_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptDonationRequest {
    /// Whether the receiver wants the volunteer relay to deliver.
    #[serde(default)]
    pub volunteer: bool,
    /// The request to reconcile against. Falls back to the receiver's oldest active one.
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Body of `POST /api/donations/nearby`. Both fields are required; they are
/// optional here only so a missing one can be reported with a proper message.
#[derive(Debug, Deserialize)]
pub struct NearbyDonationsRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub long: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateRequest {
    pub quantity_donated: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceiverRequest {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub receiver_location: ReceiverLocation,
    pub quantity: f64,
}

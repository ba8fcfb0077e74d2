use crate::model::location::ReceiverLocation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A receiver's outstanding need for food.
///
/// `quantity` is what is still missing, not what was originally asked for: it
/// shrinks every time a donation is reconciled against the request. Once it
/// reaches zero the request is closed (`is_active == false`) but kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverRequest {
    pub id: Uuid,
    pub receiver_id: Uuid,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub receiver_location: ReceiverLocation,
    pub quantity: f64,
    pub is_active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of applying a donated quantity to a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub request_id: Uuid,
    pub remaining_quantity: f64,
    pub request_closed: bool,
}

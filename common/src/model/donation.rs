use crate::model::location::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A donor's offer of food, tracked from creation until hand-off.
///
/// The JSON form uses camelCase keys (`donorId`, `needVolunteer`, ...), which is
/// the shape the mobile and web clients already consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub receiver_id: Option<Uuid>,
    /// The receiver request this donation was reconciled against on accept.
    pub request_id: Option<Uuid>,
    pub quantity: f64,
    pub shelf_life: String,
    pub location: Location,
    pub picture_url: Option<String>,
    pub need_volunteer: bool,
    pub status: DonationStatus,
    pub volunteer_id: Option<Uuid>,
    /// Bumped on every persisted write; updates are conditional on it.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hand-off state of a donation.
///
/// The wire names are kept as the clients know them, which is why the casing
/// is not uniform (`pickedByVolunteer` next to `self_pickup`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DonationStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "assigning_volunteer")]
    AssigningVolunteer,
    #[serde(rename = "self_pickup")]
    SelfPickup,
    #[serde(rename = "volunteer_assigned")]
    VolunteerAssigned,
    #[serde(rename = "pickedByVolunteer")]
    PickedByVolunteer,
    #[serde(rename = "pickbydonor")]
    PickByDonor,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown donation status '{0}'")]
pub struct UnknownStatus(pub String);

impl DonationStatus {
    pub const ALL: [DonationStatus; 9] = [
        DonationStatus::Pending,
        DonationStatus::Accepted,
        DonationStatus::AssigningVolunteer,
        DonationStatus::SelfPickup,
        DonationStatus::VolunteerAssigned,
        DonationStatus::PickedByVolunteer,
        DonationStatus::PickByDonor,
        DonationStatus::Completed,
        DonationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Accepted => "accepted",
            DonationStatus::AssigningVolunteer => "assigning_volunteer",
            DonationStatus::SelfPickup => "self_pickup",
            DonationStatus::VolunteerAssigned => "volunteer_assigned",
            DonationStatus::PickedByVolunteer => "pickedByVolunteer",
            DonationStatus::PickByDonor => "pickbydonor",
            DonationStatus::Completed => "completed",
            DonationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DonationStatus::Completed | DonationStatus::Rejected)
    }

    /// Forward moves permitted out of this state by a plain status update.
    ///
    /// `assigning_volunteer` and `self_pickup` are never reachable from
    /// `pending` or `accepted` here: entering them is the receiver's accept,
    /// which also reconciles the paired request.
    pub fn allowed_targets(&self) -> &'static [DonationStatus] {
        use DonationStatus::*;
        match self {
            Pending => &[Accepted, Rejected],
            Accepted => &[Rejected],
            AssigningVolunteer => &[VolunteerAssigned, SelfPickup, PickByDonor],
            VolunteerAssigned => &[PickedByVolunteer],
            SelfPickup => &[PickByDonor, Completed],
            PickedByVolunteer => &[Completed],
            PickByDonor => &[Completed],
            Completed | Rejected => &[],
        }
    }

    /// Re-applying the current state is always permitted and changes nothing.
    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        *self == next || self.allowed_targets().contains(&next)
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DonationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

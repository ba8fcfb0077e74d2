use crate::error::LedgerError;
use crate::ledger::{lifecycle, proximity, reconcile, Ledger};
use crate::store::{donations, now, requests};
use crate::validation::{self, DonationDraft, RequestDraft};
use common::model::donation::{Donation, DonationStatus};
use common::model::location::GeoPoint;
use common::model::receiver_request::{ReceiverRequest, Reconciliation};
use log::info;
use uuid::Uuid;

/// Statuses shown to a donor as "decided" by a receiver.
const DECIDED: [DonationStatus; 3] = [
    DonationStatus::Accepted,
    DonationStatus::SelfPickup,
    DonationStatus::Rejected,
];

/// A donor's decided donations.
#[derive(Debug)]
pub struct DonorHistory {
    pub decided: Vec<Donation>,
}

impl Ledger {
    pub fn create_donation(&mut self, draft: DonationDraft) -> Result<Donation, LedgerError> {
        let at = now();
        let donation = Donation {
            id: Uuid::new_v4(),
            donor_id: draft.donor_id,
            receiver_id: draft.receiver_id,
            request_id: None,
            quantity: draft.quantity,
            shelf_life: draft.shelf_life,
            location: draft.location,
            picture_url: draft.picture_url,
            need_volunteer: false,
            status: DonationStatus::Pending,
            volunteer_id: None,
            version: 0,
            created_at: at,
            updated_at: at,
        };
        donations::insert(self.store.conn(), &donation)?;
        info!("donation {} created by donor {}", donation.id, donation.donor_id);
        Ok(donation)
    }

    pub fn donation(&mut self, id: Uuid) -> Result<Donation, LedgerError> {
        donations::require(self.store.conn(), id)
    }

    pub fn delete_donation(&mut self, id: Uuid) -> Result<Donation, LedgerError> {
        let removed = donations::delete(self.store.conn(), id)?;
        info!("donation {id} deleted");
        Ok(removed)
    }

    /// Loads a donation, applies `change` and writes it back in one transaction.
    fn mutate_donation<F>(&mut self, id: Uuid, change: F) -> Result<Donation, LedgerError>
    where
        F: FnOnce(&mut Donation) -> Result<(), LedgerError>,
    {
        let tx = self.store.transaction()?;
        let mut donation = donations::require(&tx, id)?;
        change(&mut donation)?;
        donations::update(&tx, &mut donation)?;
        tx.commit()?;
        Ok(donation)
    }

    /// Accepts a donation on behalf of `receiver_id` and reconciles the paired
    /// request, both in the same transaction.
    ///
    /// The paired request is `request_id` when given, otherwise the receiver's
    /// oldest active request. Without either, the donation is accepted and no
    /// request is touched. Only the receiver a donation is addressed to (if
    /// any) may accept it, and only against one of their own requests.
    pub fn accept_donation(
        &mut self,
        id: Uuid,
        receiver_id: Uuid,
        volunteer_requested: bool,
        request_id: Option<Uuid>,
    ) -> Result<(Donation, Option<Reconciliation>), LedgerError> {
        let tx = self.store.transaction()?;
        let mut donation = donations::require(&tx, id)?;
        if donation.receiver_id.is_some_and(|addressed| addressed != receiver_id) {
            return Err(LedgerError::validation(
                "Donation is addressed to another receiver",
            ));
        }
        lifecycle::accept(&mut donation, volunteer_requested)?;

        let paired = match request_id {
            Some(request_id) => {
                let request = requests::require(&tx, request_id)?;
                if request.receiver_id != receiver_id {
                    return Err(LedgerError::validation(
                        "Request belongs to another receiver",
                    ));
                }
                if !request.is_active {
                    return Err(LedgerError::validation("Request is already closed"));
                }
                Some(request)
            }
            None => requests::oldest_active_for_receiver(&tx, receiver_id)?,
        };

        let reconciliation = match paired {
            Some(mut request) => {
                let outcome =
                    reconcile::apply(self.policy.as_ref(), &mut request, donation.quantity);
                requests::update(&tx, &mut request)?;
                donation.request_id = Some(request.id);
                Some(outcome)
            }
            None => None,
        };
        donation.receiver_id = Some(receiver_id);

        donations::update(&tx, &mut donation)?;
        tx.commit()?;

        info!(
            "donation {} accepted by receiver {} ({})",
            donation.id, receiver_id, donation.status
        );
        Ok((donation, reconciliation))
    }

    pub fn assign_volunteer(&mut self, id: Uuid, volunteer_id: Uuid) -> Result<Donation, LedgerError> {
        self.mutate_donation(id, |d| lifecycle::assign_volunteer(d, volunteer_id))
    }

    pub fn mark_self_volunteer(&mut self, id: Uuid) -> Result<Donation, LedgerError> {
        self.mutate_donation(id, |d| {
            lifecycle::mark_self_volunteer(d);
            Ok(())
        })
    }

    pub fn request_volunteer(&mut self, id: Uuid) -> Result<Donation, LedgerError> {
        self.mutate_donation(id, |d| {
            lifecycle::request_volunteer(d);
            Ok(())
        })
    }

    pub fn confirm_pickup(&mut self, id: Uuid) -> Result<Donation, LedgerError> {
        self.mutate_donation(id, |d| {
            lifecycle::confirm_pickup(d);
            Ok(())
        })
    }

    pub fn update_status(&mut self, id: Uuid, status: DonationStatus) -> Result<Donation, LedgerError> {
        self.mutate_donation(id, |d| lifecycle::update_status(d, status))
    }

    /// Fails with `NotFound` when the donor never donated anything.
    pub fn donor_history(&mut self, donor_id: Uuid) -> Result<DonorHistory, LedgerError> {
        let all = donations::by_donor(self.store.conn(), donor_id)?;
        if all.is_empty() {
            return Err(LedgerError::NotFound("No donations found for this donor"));
        }
        let decided = all
            .into_iter()
            .filter(|d| DECIDED.contains(&d.status))
            .collect();
        Ok(DonorHistory { decided })
    }

    /// Accepted donations within `radius_meters` of `origin`, nearest first.
    pub fn nearby_donations(
        &mut self,
        origin: GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<Donation>, LedgerError> {
        let candidates = donations::geo_located(self.store.conn(), DonationStatus::Accepted)?;
        Ok(proximity::within_radius(origin, radius_meters, candidates))
    }

    pub fn create_request(&mut self, draft: RequestDraft) -> Result<ReceiverRequest, LedgerError> {
        let at = now();
        let request = ReceiverRequest {
            id: Uuid::new_v4(),
            receiver_id: draft.receiver_id,
            receiver_name: draft.receiver_name,
            receiver_phone: draft.receiver_phone,
            receiver_address: draft.receiver_address,
            receiver_location: draft.receiver_location,
            quantity: draft.quantity,
            is_active: true,
            version: 0,
            created_at: at,
            updated_at: at,
        };
        requests::insert(self.store.conn(), &request)?;
        info!("request {} opened by receiver {}", request.id, request.receiver_id);
        Ok(request)
    }

    pub fn request(&mut self, id: Uuid) -> Result<ReceiverRequest, LedgerError> {
        requests::require(self.store.conn(), id)
    }

    pub fn active_requests(&mut self) -> Result<Vec<ReceiverRequest>, LedgerError> {
        requests::active(self.store.conn())
    }

    /// Takes `donated` off the request's outstanding quantity.
    pub fn reconcile(&mut self, request_id: Uuid, donated: f64) -> Result<Reconciliation, LedgerError> {
        let donated = validation::positive_quantity(donated, "quantityDonated")?;

        let tx = self.store.transaction()?;
        let mut request = requests::require(&tx, request_id)?;
        let outcome = reconcile::apply(self.policy.as_ref(), &mut request, donated);
        requests::update(&tx, &mut request)?;
        tx.commit()?;

        info!(
            "request {} reconciled: {} remaining{}",
            request_id,
            outcome.remaining_quantity,
            if outcome.request_closed { ", closed" } else { "" }
        );
        Ok(outcome)
    }
}

//! Status changes of a single donation.
//!
//! These functions only touch the in-memory `Donation`; persisting the result
//! (and reconciling the paired request on accept) is the caller's job.
//!
//! Three operations do not go through the transition matrix in
//! `DonationStatus::allowed_targets`: `accept` has its own source check, and
//! `mark_self_volunteer` and `confirm_pickup` force their target state
//! whatever the current one is.

use crate::error::LedgerError;
use common::model::donation::{Donation, DonationStatus};
use uuid::Uuid;

fn transition(donation: &mut Donation, next: DonationStatus) -> Result<(), LedgerError> {
    if !donation.status.can_transition_to(next) {
        return Err(LedgerError::InvalidTransition {
            from: donation.status,
            to: next,
        });
    }
    donation.status = next;
    Ok(())
}

/// Receiver accepts the donation. A volunteer is only involved when the donor
/// asked for one *and* the receiver wants one.
///
/// Only a donation that has not been accepted yet (`pending` or `accepted`)
/// can be, so a paired request is never reconciled twice for it.
pub fn accept(donation: &mut Donation, volunteer_requested: bool) -> Result<(), LedgerError> {
    let need_volunteer = donation.need_volunteer && volunteer_requested;
    let next = if need_volunteer {
        DonationStatus::AssigningVolunteer
    } else {
        DonationStatus::SelfPickup
    };

    if !matches!(
        donation.status,
        DonationStatus::Pending | DonationStatus::Accepted
    ) {
        return Err(LedgerError::InvalidTransition {
            from: donation.status,
            to: next,
        });
    }
    donation.status = next;
    donation.need_volunteer = need_volunteer;
    Ok(())
}

pub fn assign_volunteer(donation: &mut Donation, volunteer_id: Uuid) -> Result<(), LedgerError> {
    transition(donation, DonationStatus::VolunteerAssigned)?;
    donation.volunteer_id = Some(volunteer_id);
    Ok(())
}

/// The donor delivers the food personally.
pub fn mark_self_volunteer(donation: &mut Donation) {
    donation.status = DonationStatus::PickByDonor;
}

pub fn request_volunteer(donation: &mut Donation) {
    donation.need_volunteer = true;
}

pub fn confirm_pickup(donation: &mut Donation) {
    donation.status = DonationStatus::Completed;
}

pub fn update_status(donation: &mut Donation, next: DonationStatus) -> Result<(), LedgerError> {
    transition(donation, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::donations::tests::sample;

    fn donation(status: DonationStatus, need_volunteer: bool) -> Donation {
        let mut donation = sample(Uuid::new_v4(), None, None);
        donation.status = status;
        donation.need_volunteer = need_volunteer;
        donation
    }

    #[test]
    fn accept_without_volunteer_is_self_pickup() {
        for need_volunteer in [false, true] {
            let mut d = donation(DonationStatus::Pending, need_volunteer);
            accept(&mut d, false).unwrap();
            assert_eq!(d.status, DonationStatus::SelfPickup);
            assert!(!d.need_volunteer);
        }
    }

    #[test]
    fn volunteer_needs_both_sides() {
        let mut d = donation(DonationStatus::Pending, false);
        accept(&mut d, true).unwrap();
        assert_eq!(d.status, DonationStatus::SelfPickup);

        let mut d = donation(DonationStatus::Accepted, true);
        accept(&mut d, true).unwrap();
        assert_eq!(d.status, DonationStatus::AssigningVolunteer);
        assert!(d.need_volunteer);
    }

    #[test]
    fn refused_accept_leaves_donation_untouched() {
        let mut d = donation(DonationStatus::Completed, true);
        let err = accept(&mut d, false).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                from: DonationStatus::Completed,
                to: DonationStatus::SelfPickup
            }
        ));
        assert!(d.need_volunteer);
        assert_eq!(d.status, DonationStatus::Completed);

        let mut d = donation(DonationStatus::Pending, false);
        accept(&mut d, false).unwrap();
        assert!(accept(&mut d, false).is_err());
    }

    #[test]
    fn assigning_a_volunteer_advances_status() {
        let mut d = donation(DonationStatus::AssigningVolunteer, true);
        let volunteer = Uuid::new_v4();
        assign_volunteer(&mut d, volunteer).unwrap();
        assert_eq!(d.status, DonationStatus::VolunteerAssigned);
        assert_eq!(d.volunteer_id, Some(volunteer));

        let mut early = donation(DonationStatus::Pending, true);
        assert!(assign_volunteer(&mut early, volunteer).is_err());
        assert_eq!(early.volunteer_id, None);
    }

    #[test]
    fn forced_operations_ignore_current_status() {
        for status in DonationStatus::ALL {
            let mut d = donation(status, false);
            confirm_pickup(&mut d);
            assert_eq!(d.status, DonationStatus::Completed);

            let mut d = donation(status, false);
            mark_self_volunteer(&mut d);
            assert_eq!(d.status, DonationStatus::PickByDonor);
        }
    }

    #[test]
    fn request_volunteer_keeps_status() {
        let mut d = donation(DonationStatus::Accepted, false);
        request_volunteer(&mut d);
        assert!(d.need_volunteer);
        assert_eq!(d.status, DonationStatus::Accepted);
    }

    #[test]
    fn update_status_cannot_enter_accept_states() {
        for target in [DonationStatus::SelfPickup, DonationStatus::AssigningVolunteer] {
            let mut d = donation(DonationStatus::Pending, true);
            assert!(matches!(
                update_status(&mut d, target),
                Err(LedgerError::InvalidTransition {
                    from: DonationStatus::Pending,
                    ..
                })
            ));
            assert_eq!(d.status, DonationStatus::Pending);
        }
    }

    #[test]
    fn update_status_follows_the_matrix() {
        let mut d = donation(DonationStatus::Pending, false);
        update_status(&mut d, DonationStatus::Accepted).unwrap();
        update_status(&mut d, DonationStatus::Accepted).unwrap();
        assert!(update_status(&mut d, DonationStatus::Pending).is_err());
        update_status(&mut d, DonationStatus::Rejected).unwrap();
        assert!(update_status(&mut d, DonationStatus::Accepted).is_err());
        assert_eq!(d.status, DonationStatus::Rejected);
    }
}

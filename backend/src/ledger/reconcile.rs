use common::model::receiver_request::{ReceiverRequest, Reconciliation};

/// Outcome of applying a donated quantity to an outstanding one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub remaining: f64,
    pub closed: bool,
}

/// Rule for how a donation reduces a request.
///
/// Both the `donate` endpoint and donation acceptance go through the same
/// policy, so a request is always settled the same way.
pub trait ReconciliationPolicy: Send + Sync {
    fn settle(&self, outstanding: f64, donated: f64) -> Settlement;
}

/// Subtracts the donation; at or below zero the request is zeroed and closed.
///
/// Closed requests are kept, never deleted.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecrementAndClose;

impl ReconciliationPolicy for DecrementAndClose {
    fn settle(&self, outstanding: f64, donated: f64) -> Settlement {
        let remaining = outstanding - donated;
        if remaining > 0.0 {
            Settlement {
                remaining,
                closed: false,
            }
        } else {
            Settlement {
                remaining: 0.0,
                closed: true,
            }
        }
    }
}

/// Applies `donated` to `request` in place.
///
/// Not idempotent: settling the same quantity twice takes it off twice.
pub fn apply(
    policy: &dyn ReconciliationPolicy,
    request: &mut ReceiverRequest,
    donated: f64,
) -> Reconciliation {
    let settlement = policy.settle(request.quantity, donated);
    request.quantity = settlement.remaining;
    request.is_active = !settlement.closed;

    Reconciliation {
        request_id: request.id,
        remaining_quantity: settlement.remaining,
        request_closed: settlement.closed,
    }
}

//! # Donation Service Module
//!
//! Routes under `/api/donations`. Handlers validate their input, hand the
//! actual work to the ledger worker and shape the JSON answer.
//!
//! ## Sub-modules:
//! - `create`: multipart upload of a new donation, with an optional picture.
//! - `picture`: storage of uploaded pictures on disk.
//! - `get` / `delete`: single-donation lookup and removal.
//! - `accept`: a receiver accepts a donation; reconciles the paired request.
//! - `volunteer`: a volunteer takes over the delivery.
//! - `status`: the remaining status changes (validated update, self delivery,
//!   pickup confirmation, volunteer flag).
//! - `nearby`: proximity lookup of accepted donations.
//! - `donor`: the acting donor's decided donations.

mod accept;
mod create;
mod delete;
mod donor;
mod get;
mod nearby;
mod picture;
mod status;
mod volunteer;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

/// The base path for all donation-related API endpoints.
const API_PATH: &str = "/api/donations";

/// Configures and returns the Actix `Scope` for all donation routes.
///
/// # Registered Routes:
///
/// *   **`POST /`**: multipart form with a `json` part (`NewDonation`) and an
///     optional `picture` file part. Requires `X-User-Id` (the donor).
/// *   **`POST /nearby`**: `{lat, long}`; accepted donations within the
///     configured radius, nearest first.
/// *   **`GET /donor`**: the acting donor's accepted, self-pickup and rejected donations.
/// *   **`GET /{id}`**, **`DELETE /{id}`**.
/// *   **`PUT /{id}/accept`**: `{volunteer, requestId?}`. Requires `X-User-Id` (the receiver).
/// *   **`PUT /{id}/assign-volunteer`**: requires `X-User-Id` (the volunteer).
/// *   **`PUT /{id}/status`**: `{status}`, checked against the transition matrix.
/// *   **`PUT /{id}/self-volunteer`**, **`PUT /{id}/confirm-pickup`**,
///     **`PUT /{id}/need-volunteer`**.
///
/// Literal segments are registered before `/{id}` so they are not captured by it.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("/nearby", post().to(nearby::process))
        .route("/donor", get().to(donor::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", delete().to(delete::process))
        .route("/{id}/accept", put().to(accept::process))
        .route("/{id}/assign-volunteer", put().to(volunteer::process))
        .route("/{id}/status", put().to(status::update))
        .route("/{id}/self-volunteer", put().to(status::self_volunteer))
        .route("/{id}/confirm-pickup", put().to(status::confirm_pickup))
        .route("/{id}/need-volunteer", put().to(status::need_volunteer))
}

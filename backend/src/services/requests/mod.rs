//! # Receiver Request Service Module
//!
//! Routes under `/api/requests`: receivers open requests for a quantity of
//! food, and donations are counted against them until they close.
//!
//! ## Sub-modules:
//! - `create`: opens a new request for the acting receiver.
//! - `list`: all requests that are still active.
//! - `get`: a single request, active or closed.
//! - `donate`: takes a donated quantity off a request.

mod create;
mod donate;
mod get;
mod list;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/requests";

/// Configures and returns the Actix `Scope` for receiver requests.
///
/// # Registered Routes:
///
/// *   **`POST /`**: a `NewReceiverRequest`. Requires `X-User-Id` (the receiver).
/// *   **`GET /`**: active requests, oldest first.
/// *   **`GET /{id}`**.
/// *   **`POST /{id}/donate`**: `{quantityDonated}`; answers with the remaining
///     quantity and whether the request is now closed.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}/donate", post().to(donate::process))
}

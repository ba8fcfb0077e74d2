//! Types shared between the backend and its clients.
//!
//! - `model`: the persisted entities (donations, receiver requests) and their
//!   value types.
//! - `requests`: JSON payloads accepted by the HTTP API.

pub mod model;
pub mod requests;

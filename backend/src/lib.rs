//! Backend of the food donation coordination service.
//!
//! Donors post surplus food, receivers open requests and accept donations,
//! volunteers pick up and deliver. All state lives in SQLite behind a single
//! ledger worker (see [`ledger`]); the Actix handlers in [`services`] only
//! validate input and shape responses.

pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod services;
pub mod store;
pub mod validation;

use crate::config::Config;
use crate::error::ApiError;
use crate::ledger::LedgerState;
use actix_web::web;

/// Registers shared state and every route on an application.
///
/// Used by `main` and by the integration tests, so both serve the same app.
pub fn configure_app(cfg: &mut web::ServiceConfig, ledger: web::Data<LedgerState>, config: web::Data<Config>) {
    let images = actix_files::Files::new("/images", config.upload_dir.clone());

    cfg.app_data(json_config(config.json_limit))
        .app_data(ledger)
        .app_data(config)
        .service(services::donations::configure_routes())
        .service(services::requests::configure_routes())
        .service(images);
}

/// JSON extractor settings; malformed bodies answer in the usual `{msg, error}` shape.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ApiError::payload("Invalid JSON payload", err.to_string()).into())
}

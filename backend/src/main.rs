use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use backend::config::Config;
use backend::ledger::{Ledger, LedgerState};
use backend::store::Store;
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(io::Error::other)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let store = Store::open(&config.database_path).map_err(io::Error::other)?;
    info!("database opened at {}", config.database_path.display());

    let (ledger, _worker) = LedgerState::start(Ledger::new(store), config.ledger_queue)?;
    let ledger = web::Data::new(ledger);
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    info!("Server running at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| backend::configure_app(cfg, ledger.clone(), config.clone()))
    })
    .bind(bind)?
    .run()
    .await
}

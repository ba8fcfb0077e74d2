use log::info;
use std::path::PathBuf;
use std::{env, fmt::Display, str::FromStr};
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "foodbridge.sqlite";
const DEFAULT_UPLOAD_DIR: &str = "images";
/// Radius the proximity lookup uses unless configured otherwise.
pub const DEFAULT_NEARBY_RADIUS_METERS: f64 = 5000.0;
const DEFAULT_LEDGER_QUEUE: usize = 100;
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Directory uploaded donation pictures are written to and served from.
    pub upload_dir: PathBuf,
    pub nearby_radius_meters: f64,
    /// Capacity of the queue in front of the ledger worker.
    pub ledger_queue: usize,
    pub json_limit: usize,
}

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self {
            host: try_load("FOODBRIDGE_HOST", DEFAULT_HOST)?,
            port: try_load("FOODBRIDGE_PORT", DEFAULT_PORT)?,
            database_path: try_load("FOODBRIDGE_DB_PATH", DEFAULT_DB_PATH)?,
            upload_dir: try_load("FOODBRIDGE_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)?,
            nearby_radius_meters: try_load(
                "FOODBRIDGE_NEARBY_RADIUS_METERS",
                DEFAULT_NEARBY_RADIUS_METERS,
            )?,
            ledger_queue: try_load("FOODBRIDGE_LEDGER_QUEUE", DEFAULT_LEDGER_QUEUE)?,
            json_limit: try_load("FOODBRIDGE_JSON_LIMIT", DEFAULT_JSON_LIMIT)?,
        };

        if !(config.nearby_radius_meters.is_finite() && config.nearby_radius_meters > 0.0) {
            return Err(ConfigError {
                key: "FOODBRIDGE_NEARBY_RADIUS_METERS",
                reason: "must be a positive number of meters".to_string(),
            });
        }
        if config.ledger_queue == 0 {
            return Err(ConfigError {
                key: "FOODBRIDGE_LEDGER_QUEUE",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            nearby_radius_meters: DEFAULT_NEARBY_RADIUS_METERS,
            ledger_queue: DEFAULT_LEDGER_QUEUE,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

fn try_load<T>(key: &'static str, default: impl Display) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
    })
}

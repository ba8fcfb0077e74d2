//! SQLite persistence for the two ledgers.
//!
//! Each entity lives in its own table and carries a `version` column. Updates
//! are conditional on the version that was read (`WHERE id = ? AND version = ?`),
//! so a writer working from a stale copy gets `LedgerError::Conflict` instead
//! of silently overwriting someone else's change.

pub mod donations;
pub mod requests;

use crate::error::LedgerError;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, Transaction};
use std::path::Path;
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS donations (
    id             TEXT PRIMARY KEY,
    donor_id       TEXT NOT NULL,
    receiver_id    TEXT,
    request_id     TEXT,
    quantity       REAL NOT NULL,
    shelf_life     TEXT NOT NULL,
    location_name  TEXT NOT NULL,
    latitude       REAL,
    longitude      REAL,
    picture_url    TEXT,
    need_volunteer INTEGER NOT NULL DEFAULT 0,
    status         TEXT NOT NULL,
    volunteer_id   TEXT,
    version        INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS donations_donor ON donations (donor_id);
CREATE INDEX IF NOT EXISTS donations_status ON donations (status);

CREATE TABLE IF NOT EXISTS receiver_requests (
    id               TEXT PRIMARY KEY,
    receiver_id      TEXT NOT NULL,
    receiver_name    TEXT NOT NULL,
    receiver_phone   TEXT NOT NULL,
    receiver_address TEXT NOT NULL,
    location_name    TEXT NOT NULL,
    latitude         REAL NOT NULL,
    longitude        REAL NOT NULL,
    quantity         REAL NOT NULL CHECK (quantity >= 0),
    is_active        INTEGER NOT NULL DEFAULT 1,
    version          INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS receiver_requests_receiver ON receiver_requests (receiver_id, is_active);
";

/// Owner of the database connection. Only the ledger worker holds one.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn transaction(&mut self) -> Result<Transaction<'_>, LedgerError> {
        Ok(self.conn.transaction()?)
    }
}

/// Current time at the precision the store keeps, so a freshly built entity
/// compares equal to its persisted copy.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn optional_uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

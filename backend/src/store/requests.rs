use crate::error::LedgerError;
use crate::store::{now, time_column, timestamp, uuid_column};
use common::model::location::ReceiverLocation;
use common::model::receiver_request::ReceiverRequest;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const COLUMNS: &str = "id, receiver_id, receiver_name, receiver_phone, receiver_address, \
    location_name, latitude, longitude, quantity, is_active, version, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<ReceiverRequest> {
    Ok(ReceiverRequest {
        id: uuid_column(row, 0)?,
        receiver_id: uuid_column(row, 1)?,
        receiver_name: row.get(2)?,
        receiver_phone: row.get(3)?,
        receiver_address: row.get(4)?,
        receiver_location: ReceiverLocation {
            name: row.get(5)?,
            lat: row.get(6)?,
            long: row.get(7)?,
        },
        quantity: row.get(8)?,
        is_active: row.get(9)?,
        version: row.get(10)?,
        created_at: time_column(row, 11)?,
        updated_at: time_column(row, 12)?,
    })
}

pub fn insert(conn: &Connection, request: &ReceiverRequest) -> Result<(), LedgerError> {
    conn.execute(
        &format!(
            "INSERT INTO receiver_requests ({COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            request.id.to_string(),
            request.receiver_id.to_string(),
            request.receiver_name,
            request.receiver_phone,
            request.receiver_address,
            request.receiver_location.name,
            request.receiver_location.lat,
            request.receiver_location.long,
            request.quantity,
            request.is_active,
            request.version,
            timestamp(&request.created_at),
            timestamp(&request.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<ReceiverRequest>, LedgerError> {
    let request = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM receiver_requests WHERE id = ?1"),
            params![id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(request)
}

pub fn require(conn: &Connection, id: Uuid) -> Result<ReceiverRequest, LedgerError> {
    get(conn, id)?.ok_or(LedgerError::NotFound("Request not found"))
}

/// Persists the outstanding quantity and active flag, conditional on the
/// version that was read.
pub fn update(conn: &Connection, request: &mut ReceiverRequest) -> Result<(), LedgerError> {
    let updated_at = now();
    let changed = conn.execute(
        "UPDATE receiver_requests SET quantity = ?1, is_active = ?2, \
             version = version + 1, updated_at = ?3 \
         WHERE id = ?4 AND version = ?5",
        params![
            request.quantity,
            request.is_active,
            timestamp(&updated_at),
            request.id.to_string(),
            request.version,
        ],
    )?;

    if changed == 0 {
        return match get(conn, request.id)? {
            Some(_) => Err(LedgerError::Conflict("Request")),
            None => Err(LedgerError::NotFound("Request not found")),
        };
    }

    request.version += 1;
    request.updated_at = updated_at;
    Ok(())
}

/// The receiver's longest-waiting request that still needs food.
pub fn oldest_active_for_receiver(
    conn: &Connection,
    receiver_id: Uuid,
) -> Result<Option<ReceiverRequest>, LedgerError> {
    let request = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS} FROM receiver_requests \
                 WHERE receiver_id = ?1 AND is_active = 1 \
                 ORDER BY created_at, rowid LIMIT 1"
            ),
            params![receiver_id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(request)
}

pub fn active(conn: &Connection) -> Result<Vec<ReceiverRequest>, LedgerError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM receiver_requests WHERE is_active = 1 ORDER BY created_at, rowid"
    ))?;
    let requests = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(requests)
}

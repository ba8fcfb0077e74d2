use crate::error::LedgerError;
use crate::store::{now, optional_uuid_column, time_column, timestamp, uuid_column};
use common::model::donation::{Donation, DonationStatus};
use common::model::location::Location;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const COLUMNS: &str = "id, donor_id, receiver_id, request_id, quantity, shelf_life, \
    location_name, latitude, longitude, picture_url, need_volunteer, status, volunteer_id, \
    version, created_at, updated_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Donation> {
    let status: String = row.get(11)?;
    let status = status
        .parse::<DonationStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;

    Ok(Donation {
        id: uuid_column(row, 0)?,
        donor_id: uuid_column(row, 1)?,
        receiver_id: optional_uuid_column(row, 2)?,
        request_id: optional_uuid_column(row, 3)?,
        quantity: row.get(4)?,
        shelf_life: row.get(5)?,
        location: Location {
            name: row.get(6)?,
            lat: row.get(7)?,
            long: row.get(8)?,
        },
        picture_url: row.get(9)?,
        need_volunteer: row.get(10)?,
        status,
        volunteer_id: optional_uuid_column(row, 12)?,
        version: row.get(13)?,
        created_at: time_column(row, 14)?,
        updated_at: time_column(row, 15)?,
    })
}

pub fn insert(conn: &Connection, donation: &Donation) -> Result<(), LedgerError> {
    conn.execute(
        &format!(
            "INSERT INTO donations ({COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        ),
        params![
            donation.id.to_string(),
            donation.donor_id.to_string(),
            donation.receiver_id.map(|id| id.to_string()),
            donation.request_id.map(|id| id.to_string()),
            donation.quantity,
            donation.shelf_life,
            donation.location.name,
            donation.location.lat,
            donation.location.long,
            donation.picture_url,
            donation.need_volunteer,
            donation.status.as_str(),
            donation.volunteer_id.map(|id| id.to_string()),
            donation.version,
            timestamp(&donation.created_at),
            timestamp(&donation.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<Donation>, LedgerError> {
    let donation = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM donations WHERE id = ?1"),
            params![id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(donation)
}

pub fn require(conn: &Connection, id: Uuid) -> Result<Donation, LedgerError> {
    get(conn, id)?.ok_or(LedgerError::NotFound("Donation not found"))
}

/// Writes the mutable fields back, provided nobody else bumped the version
/// since `donation` was read. On success `donation` carries the new version.
pub fn update(conn: &Connection, donation: &mut Donation) -> Result<(), LedgerError> {
    let updated_at = now();
    let changed = conn.execute(
        "UPDATE donations SET receiver_id = ?1, request_id = ?2, quantity = ?3, shelf_life = ?4, \
             location_name = ?5, latitude = ?6, longitude = ?7, picture_url = ?8, \
             need_volunteer = ?9, status = ?10, volunteer_id = ?11, \
             version = version + 1, updated_at = ?12 \
         WHERE id = ?13 AND version = ?14",
        params![
            donation.receiver_id.map(|id| id.to_string()),
            donation.request_id.map(|id| id.to_string()),
            donation.quantity,
            donation.shelf_life,
            donation.location.name,
            donation.location.lat,
            donation.location.long,
            donation.picture_url,
            donation.need_volunteer,
            donation.status.as_str(),
            donation.volunteer_id.map(|id| id.to_string()),
            timestamp(&updated_at),
            donation.id.to_string(),
            donation.version,
        ],
    )?;

    if changed == 0 {
        return match get(conn, donation.id)? {
            Some(_) => Err(LedgerError::Conflict("Donation")),
            None => Err(LedgerError::NotFound("Donation not found")),
        };
    }

    donation.version += 1;
    donation.updated_at = updated_at;
    Ok(())
}

/// Removes a donation and hands back what was stored.
pub fn delete(conn: &Connection, id: Uuid) -> Result<Donation, LedgerError> {
    let donation = require(conn, id)?;
    conn.execute("DELETE FROM donations WHERE id = ?1", params![id.to_string()])?;
    Ok(donation)
}

fn collect(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<Donation>, LedgerError> {
    let mut stmt = conn.prepare(sql)?;
    let donations = stmt
        .query_map(args, from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(donations)
}

/// All donations of a donor, oldest first.
pub fn by_donor(conn: &Connection, donor_id: Uuid) -> Result<Vec<Donation>, LedgerError> {
    collect(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM donations WHERE donor_id = ?1 ORDER BY created_at, rowid"
        ),
        params![donor_id.to_string()],
    )
}

/// Donations in `status` that carry both coordinates, i.e. the ones the
/// proximity lookup may consider.
pub fn geo_located(
    conn: &Connection,
    status: DonationStatus,
) -> Result<Vec<Donation>, LedgerError> {
    collect(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM donations \
             WHERE status = ?1 AND latitude IS NOT NULL AND longitude IS NOT NULL"
        ),
        params![status.as_str()],
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::Store;

    pub(crate) fn sample(donor_id: Uuid, lat: Option<f64>, long: Option<f64>) -> Donation {
        let at = now();
        Donation {
            id: Uuid::new_v4(),
            donor_id,
            receiver_id: None,
            request_id: None,
            quantity: 12.0,
            shelf_life: "2 days".to_string(),
            location: Location {
                name: "Community kitchen".to_string(),
                lat,
                long,
            },
            picture_url: None,
            need_volunteer: false,
            status: DonationStatus::Pending,
            volunteer_id: None,
            version: 0,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn insert_then_get_returns_the_same_donation() {
        let store = Store::open_in_memory().unwrap();
        let donation = sample(Uuid::new_v4(), Some(12.97), Some(77.59));
        insert(store.conn(), &donation).unwrap();

        assert_eq!(get(store.conn(), donation.id).unwrap(), Some(donation));
        assert!(get(store.conn(), Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_bumps_version_and_rejects_stale_copies() {
        let store = Store::open_in_memory().unwrap();
        let mut donation = sample(Uuid::new_v4(), None, None);
        insert(store.conn(), &donation).unwrap();

        let mut stale = donation.clone();
        donation.status = DonationStatus::Accepted;
        update(store.conn(), &mut donation).unwrap();
        assert_eq!(donation.version, 1);
        assert_eq!(require(store.conn(), donation.id).unwrap(), donation);

        stale.status = DonationStatus::Rejected;
        assert!(matches!(
            update(store.conn(), &mut stale),
            Err(LedgerError::Conflict("Donation"))
        ));
        assert_eq!(
            require(store.conn(), donation.id).unwrap().status,
            DonationStatus::Accepted
        );
    }

    #[test]
    fn update_of_missing_donation_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let mut ghost = sample(Uuid::new_v4(), None, None);
        assert!(matches!(
            update(store.conn(), &mut ghost),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn delete_returns_removed_donation() {
        let store = Store::open_in_memory().unwrap();
        let donation = sample(Uuid::new_v4(), None, None);
        insert(store.conn(), &donation).unwrap();

        assert_eq!(delete(store.conn(), donation.id).unwrap(), donation);
        assert!(matches!(
            delete(store.conn(), donation.id),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn geo_located_skips_donations_without_coordinates() {
        let store = Store::open_in_memory().unwrap();
        let donor = Uuid::new_v4();
        let mut located = sample(donor, Some(1.0), Some(2.0));
        located.status = DonationStatus::Accepted;
        let mut half = sample(donor, Some(1.0), None);
        half.status = DonationStatus::Accepted;
        let pending = sample(donor, Some(1.0), Some(2.0));
        for donation in [&located, &half, &pending] {
            insert(store.conn(), donation).unwrap();
        }

        let found = geo_located(store.conn(), DonationStatus::Accepted).unwrap();
        assert_eq!(found, vec![located]);
        assert_eq!(by_donor(store.conn(), donor).unwrap().len(), 3);
    }
}

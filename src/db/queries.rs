use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, Listing, User, UserBooking};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ── Users ──

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, fname, lname, email) VALUES (?1, ?2, ?3, ?4)",
        params![user.id, user.fname, user.lname, user.email],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, fname, lname, email FROM users WHERE id = ?1",
        params![id],
        |row| {
            Ok(User {
                id: row.get(0)?,
                fname: row.get(1)?,
                lname: row.get(2)?,
                email: row.get(3)?,
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── API tokens ──

pub fn insert_token(conn: &Connection, token: &str, user_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO api_tokens (token, user_id) VALUES (?1, ?2)",
        params![token, user_id],
    )?;
    Ok(())
}

pub fn lookup_token(conn: &Connection, token: &str) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT user_id FROM api_tokens WHERE token = ?1",
        params![token],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(user_id) => Ok(Some(user_id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Listings ──

pub fn create_listing(
    conn: &Connection,
    user_id: &str,
    description: &str,
    location: &str,
    price: i64,
) -> anyhow::Result<Listing> {
    let created_at = Utc::now().naive_utc();
    conn.execute(
        "INSERT INTO listings (user_id, description, location, price, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            description,
            location,
            price,
            created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;

    let listing_id = conn.last_insert_rowid();
    Ok(Listing {
        listing_id,
        user_id: user_id.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        price,
        created_at,
    })
}

pub fn get_listing(conn: &Connection, listing_id: i64) -> anyhow::Result<Option<Listing>> {
    let result = conn.query_row(
        "SELECT listing_id, user_id, description, location, price, created_at
         FROM listings WHERE listing_id = ?1",
        params![listing_id],
        |row| Ok(parse_listing_row(row)),
    );

    match result {
        Ok(listing) => Ok(Some(listing?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_listing_owner(conn: &Connection, listing_id: i64) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT user_id FROM listings WHERE listing_id = ?1",
        params![listing_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(owner) => Ok(Some(owner)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn all_listings(conn: &Connection) -> anyhow::Result<Vec<Listing>> {
    let mut stmt = conn.prepare(
        "SELECT listing_id, user_id, description, location, price, created_at
         FROM listings ORDER BY listing_id DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_listing_row(row)))?;

    let mut listings = vec![];
    for row in rows {
        listings.push(row??);
    }
    Ok(listings)
}

pub fn listings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Listing>> {
    let mut stmt = conn.prepare(
        "SELECT listing_id, user_id, description, location, price, created_at
         FROM listings WHERE user_id = ?1 ORDER BY listing_id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_listing_row(row)))?;

    let mut listings = vec![];
    for row in rows {
        listings.push(row??);
    }
    Ok(listings)
}

pub fn search_listings(conn: &Connection, location: &str) -> anyhow::Result<Vec<Listing>> {
    let pattern = format!("%{location}%");
    let mut stmt = conn.prepare(
        "SELECT listing_id, user_id, description, location, price, created_at
         FROM listings WHERE location LIKE ?1 ORDER BY listing_id DESC",
    )?;
    let rows = stmt.query_map(params![pattern], |row| Ok(parse_listing_row(row)))?;

    let mut listings = vec![];
    for row in rows {
        listings.push(row??);
    }
    Ok(listings)
}

fn parse_listing_row(row: &rusqlite::Row) -> anyhow::Result<Listing> {
    let created_at_str: String = row.get(5)?;
    Ok(Listing {
        listing_id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        price: row.get(4)?,
        created_at: parse_datetime(&created_at_str)?,
    })
}

// ── Bookings ──

pub fn create_booking(
    conn: &Connection,
    listing_id: i64,
    user_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> anyhow::Result<Booking> {
    let date_booked = Utc::now().naive_utc();
    conn.execute(
        "INSERT INTO bookings (listing_id, user_id, start_date, end_date, date_booked, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            listing_id,
            user_id,
            start_date.format(DATE_FMT).to_string(),
            end_date.format(DATE_FMT).to_string(),
            date_booked.format(DATETIME_FMT).to_string(),
            BookingStatus::Pending.as_str(),
        ],
    )?;

    Ok(Booking {
        booking_id: conn.last_insert_rowid(),
        listing_id,
        user_id: user_id.to_string(),
        start_date,
        end_date,
        date_booked,
        status: BookingStatus::Pending,
    })
}

pub fn get_booking(conn: &Connection, booking_id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT booking_id, listing_id, user_id, start_date, end_date, date_booked, status
         FROM bookings WHERE booking_id = ?1",
        params![booking_id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn bookings_for_listing(
    conn: &Connection,
    listing_id: i64,
    status: Option<BookingStatus>,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (&str, Vec<Box<dyn rusqlite::types::ToSql>>) = match status {
        Some(status) => (
            "SELECT booking_id, listing_id, user_id, start_date, end_date, date_booked, status
             FROM bookings WHERE listing_id = ?1 AND status = ?2 ORDER BY booking_id DESC",
            vec![
                Box::new(listing_id) as Box<dyn rusqlite::types::ToSql>,
                Box::new(status.as_str().to_string()),
            ],
        ),
        None => (
            "SELECT booking_id, listing_id, user_id, start_date, end_date, date_booked, status
             FROM bookings WHERE listing_id = ?1 ORDER BY booking_id DESC",
            vec![Box::new(listing_id) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<UserBooking>> {
    let mut stmt = conn.prepare(
        "SELECT b.booking_id, b.listing_id, b.user_id, b.start_date, b.end_date, b.date_booked,
                b.status, l.description, l.location, l.price
         FROM bookings b
         INNER JOIN listings l ON b.listing_id = l.listing_id
         WHERE b.user_id = ?1 ORDER BY b.booking_id DESC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        let start_str: String = row.get(3)?;
        let end_str: String = row.get(4)?;
        let booked_str: String = row.get(5)?;
        let status_str: String = row.get(6)?;
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            start_str,
            end_str,
            booked_str,
            status_str,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
            row.get::<_, i64>(9)?,
        ))
    })?;

    let mut bookings = vec![];
    for row in rows {
        let (booking_id, listing_id, user_id, start, end, booked, status, description, location, price) =
            row?;
        bookings.push(UserBooking {
            booking_id,
            listing_id,
            user_id,
            start_date: parse_date(&start)?,
            end_date: parse_date(&end)?,
            date_booked: parse_datetime(&booked)?,
            status: BookingStatus::parse(&status),
            description,
            location,
            price,
        });
    }
    Ok(bookings)
}

/// CONFIRMED bookings for the listing whose inclusive interval overlaps
/// `[start_date, end_date]`, optionally excluding one booking (the row
/// being confirmed).
pub fn overlapping_confirmed(
    conn: &Connection,
    listing_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude: Option<i64>,
) -> anyhow::Result<Vec<Booking>> {
    let start = start_date.format(DATE_FMT).to_string();
    let end = end_date.format(DATE_FMT).to_string();

    let (sql, params_vec): (&str, Vec<Box<dyn rusqlite::types::ToSql>>) = match exclude {
        Some(booking_id) => (
            "SELECT booking_id, listing_id, user_id, start_date, end_date, date_booked, status
             FROM bookings
             WHERE listing_id = ?1 AND status = 'CONFIRMED'
               AND start_date <= ?2 AND end_date >= ?3
               AND booking_id != ?4
             ORDER BY booking_id DESC",
            vec![
                Box::new(listing_id) as Box<dyn rusqlite::types::ToSql>,
                Box::new(end),
                Box::new(start),
                Box::new(booking_id),
            ],
        ),
        None => (
            "SELECT booking_id, listing_id, user_id, start_date, end_date, date_booked, status
             FROM bookings
             WHERE listing_id = ?1 AND status = 'CONFIRMED'
               AND start_date <= ?2 AND end_date >= ?3
             ORDER BY booking_id DESC",
            vec![
                Box::new(listing_id) as Box<dyn rusqlite::types::ToSql>,
                Box::new(end),
                Box::new(start),
            ],
        ),
    };

    let mut stmt = conn.prepare(sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Atomic compare-and-set on a booking's status. Returns `None` when the
/// stored status no longer equals `from` (lost race or wrong precondition);
/// the sole mutation primitive for status.
pub fn transition_status(
    conn: &Connection,
    booking_id: i64,
    from: BookingStatus,
    to: BookingStatus,
) -> anyhow::Result<Option<Booking>> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1 WHERE booking_id = ?2 AND status = ?3",
        params![to.as_str(), booking_id, from.as_str()],
    )?;

    if count == 0 {
        return Ok(None);
    }
    get_booking(conn, booking_id)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;
    let booked_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;

    Ok(Booking {
        booking_id: row.get(0)?,
        listing_id: row.get(1)?,
        user_id: row.get(2)?,
        start_date: parse_date(&start_str)?,
        end_date: parse_date(&end_str)?,
        date_booked: parse_datetime(&booked_str)?,
        status: BookingStatus::parse(&status_str),
    })
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|e| anyhow::anyhow!("bad date in database: {s}: {e}"))
}

fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .map_err(|e| anyhow::anyhow!("bad timestamp in database: {s}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn seed_user(conn: &Connection, id: &str) {
        create_user(
            conn,
            &User {
                id: id.to_string(),
                fname: "Test".to_string(),
                lname: "User".to_string(),
                email: format!("{id}@example.com"),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_transition_status_is_conditional() {
        let conn = setup_db();
        seed_user(&conn, "owner");
        seed_user(&conn, "guest");
        let listing = create_listing(&conn, "owner", "Loft", "Makati", 120).unwrap();

        let booking = create_booking(
            &conn,
            listing.listing_id,
            "guest",
            date("2024-06-01"),
            date("2024-06-05"),
        )
        .unwrap();

        let confirmed = transition_status(
            &conn,
            booking.booking_id,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        )
        .unwrap();
        assert_eq!(confirmed.unwrap().status, BookingStatus::Confirmed);

        // Second transition from PENDING must see the moved row and no-op.
        let again = transition_status(
            &conn,
            booking.booking_id,
            BookingStatus::Pending,
            BookingStatus::Declined,
        )
        .unwrap();
        assert!(again.is_none());

        let stored = get_booking(&conn, booking.booking_id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_overlapping_confirmed_inclusive_bounds() {
        let conn = setup_db();
        seed_user(&conn, "owner");
        seed_user(&conn, "guest");
        let listing = create_listing(&conn, "owner", "Studio", "Taguig", 80).unwrap();

        let booking = create_booking(
            &conn,
            listing.listing_id,
            "guest",
            date("2024-06-01"),
            date("2024-06-05"),
        )
        .unwrap();
        transition_status(
            &conn,
            booking.booking_id,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        )
        .unwrap();

        // Shares exactly the end date: still an overlap.
        let hits = overlapping_confirmed(
            &conn,
            listing.listing_id,
            date("2024-06-05"),
            date("2024-06-10"),
            None,
        )
        .unwrap();
        assert_eq!(hits.len(), 1);

        // Day after the confirmed range ends: clear.
        let hits = overlapping_confirmed(
            &conn,
            listing.listing_id,
            date("2024-06-06"),
            date("2024-06-10"),
            None,
        )
        .unwrap();
        assert!(hits.is_empty());

        // Excluding the booking itself removes the only hit.
        let hits = overlapping_confirmed(
            &conn,
            listing.listing_id,
            date("2024-06-05"),
            date("2024-06-10"),
            Some(booking.booking_id),
        )
        .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_overlap_scoped_to_listing() {
        let conn = setup_db();
        seed_user(&conn, "owner");
        seed_user(&conn, "guest");
        let a = create_listing(&conn, "owner", "Unit A", "Pasig", 100).unwrap();
        let b = create_listing(&conn, "owner", "Unit B", "Pasig", 100).unwrap();

        let booking =
            create_booking(&conn, a.listing_id, "guest", date("2024-06-01"), date("2024-06-05"))
                .unwrap();
        transition_status(
            &conn,
            booking.booking_id,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        )
        .unwrap();

        let hits =
            overlapping_confirmed(&conn, b.listing_id, date("2024-06-01"), date("2024-06-05"), None)
                .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_bookings_for_listing_newest_first() {
        let conn = setup_db();
        seed_user(&conn, "owner");
        seed_user(&conn, "guest");
        let listing = create_listing(&conn, "owner", "Villa", "Tagaytay", 300).unwrap();

        let first =
            create_booking(&conn, listing.listing_id, "guest", date("2024-07-01"), date("2024-07-02"))
                .unwrap();
        let second =
            create_booking(&conn, listing.listing_id, "guest", date("2024-08-01"), date("2024-08-02"))
                .unwrap();

        let all = bookings_for_listing(&conn, listing.listing_id, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].booking_id, second.booking_id);
        assert_eq!(all[1].booking_id, first.booking_id);

        let pending =
            bookings_for_listing(&conn, listing.listing_id, Some(BookingStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 2);
    }
}

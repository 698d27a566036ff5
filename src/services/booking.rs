use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Booking, BookingStatus};

/// Failures of the booking lifecycle, mapped to distinct HTTP statuses at
/// the route layer.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("start date must be on or before end date")]
    InvalidRange,

    #[error("Date range is not available")]
    DateConflict,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("only the listing owner may manage its bookings")]
    NotAuthorized,

    #[error("booking already resolved")]
    AlreadyResolved,

    #[error("booking dates do not match the stored range")]
    StaleRange,

    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

/// Create a PENDING booking request against a listing.
///
/// Only CONFIRMED bookings block a new request; overlapping PENDING
/// requests may coexist and are arbitrated by the owner at confirmation
/// time. A PENDING row reserves nothing, so the authoritative overlap
/// check runs again inside `confirm_booking`.
pub fn request_booking(
    conn: &Connection,
    listing_id: i64,
    user_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Booking, BookingError> {
    if start_date > end_date {
        return Err(BookingError::InvalidRange);
    }

    if queries::get_listing_owner(conn, listing_id)?.is_none() {
        return Err(BookingError::NotFound("listing"));
    }

    let conflicts = queries::overlapping_confirmed(conn, listing_id, start_date, end_date, None)?;
    if !conflicts.is_empty() {
        return Err(BookingError::DateConflict);
    }

    Ok(queries::create_booking(conn, listing_id, user_id, start_date, end_date)?)
}

/// Confirm a PENDING booking on behalf of the listing owner.
///
/// The overlap re-check and the compare-and-set run in one transaction so
/// two racing confirmations for the same window cannot both commit.
pub fn confirm_booking(
    conn: &Connection,
    booking_id: i64,
    requester: &str,
    expected_start: NaiveDate,
    expected_end: NaiveDate,
) -> Result<Booking, BookingError> {
    let booking = queries::get_booking(conn, booking_id)?.ok_or(BookingError::NotFound("booking"))?;

    authorize_owner(conn, booking.listing_id, requester)?;

    // Stale client state: the row's dates are not what the caller saw.
    if booking.start_date != expected_start || booking.end_date != expected_end {
        return Err(BookingError::StaleRange);
    }

    let tx = conn.unchecked_transaction().map_err(anyhow::Error::from)?;

    let conflicts = queries::overlapping_confirmed(
        &tx,
        booking.listing_id,
        booking.start_date,
        booking.end_date,
        Some(booking_id),
    )?;
    if !conflicts.is_empty() {
        return Err(BookingError::DateConflict);
    }

    let updated = queries::transition_status(
        &tx,
        booking_id,
        BookingStatus::Pending,
        BookingStatus::Confirmed,
    )?
    .ok_or(BookingError::AlreadyResolved)?;

    tx.commit().map_err(anyhow::Error::from)?;
    Ok(updated)
}

/// Decline a PENDING booking on behalf of the listing owner.
pub fn decline_booking(
    conn: &Connection,
    booking_id: i64,
    requester: &str,
) -> Result<Booking, BookingError> {
    let booking = queries::get_booking(conn, booking_id)?.ok_or(BookingError::NotFound("booking"))?;

    authorize_owner(conn, booking.listing_id, requester)?;

    queries::transition_status(
        conn,
        booking_id,
        BookingStatus::Pending,
        BookingStatus::Declined,
    )?
    .ok_or(BookingError::AlreadyResolved)
}

pub fn pending_for_listing(
    conn: &Connection,
    listing_id: i64,
    requester: &str,
) -> Result<Vec<Booking>, BookingError> {
    authorize_owner(conn, listing_id, requester)?;
    Ok(queries::bookings_for_listing(conn, listing_id, Some(BookingStatus::Pending))?)
}

pub fn confirmed_for_listing(
    conn: &Connection,
    listing_id: i64,
    requester: &str,
) -> Result<Vec<Booking>, BookingError> {
    authorize_owner(conn, listing_id, requester)?;
    Ok(queries::bookings_for_listing(conn, listing_id, Some(BookingStatus::Confirmed))?)
}

pub fn declined_for_listing(
    conn: &Connection,
    listing_id: i64,
    requester: &str,
) -> Result<Vec<Booking>, BookingError> {
    authorize_owner(conn, listing_id, requester)?;
    Ok(queries::bookings_for_listing(conn, listing_id, Some(BookingStatus::Declined))?)
}

/// Public availability view: CONFIRMED date ranges for a listing.
pub fn confirmed_dates(conn: &Connection, listing_id: i64) -> Result<Vec<Booking>, BookingError> {
    if queries::get_listing_owner(conn, listing_id)?.is_none() {
        return Err(BookingError::NotFound("listing"));
    }
    Ok(queries::bookings_for_listing(conn, listing_id, Some(BookingStatus::Confirmed))?)
}

fn authorize_owner(
    conn: &Connection,
    listing_id: i64,
    requester: &str,
) -> Result<(), BookingError> {
    match queries::get_listing_owner(conn, listing_id)? {
        Some(owner) if owner == requester => Ok(()),
        Some(_) => Err(BookingError::NotAuthorized),
        None => Err(BookingError::NotFound("listing")),
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: i64,
    pub listing_id: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub date_booked: NaiveDateTime,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Declined,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Declined => "DECLINED",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "CONFIRMED" => BookingStatus::Confirmed,
            "DECLINED" => BookingStatus::Declined,
            _ => BookingStatus::Pending,
        }
    }

    /// Confirmed and Declined are terminal; only Pending rows may move.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl Booking {
    /// Inclusive interval overlap: `a.start <= b.end && b.start <= a.end`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

/// A booking joined with the listing it targets, as shown on the
/// requester's "my bookings" view.
#[derive(Debug, Clone, Serialize)]
pub struct UserBooking {
    pub booking_id: i64,
    pub listing_id: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub date_booked: NaiveDateTime,
    pub status: BookingStatus,
    pub description: String,
    pub location: String,
    pub price: i64,
}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::{Booking, UserBooking};
use crate::services::booking as lifecycle;
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    booking_id: i64,
    listing_id: i64,
    user_id: String,
    start_date: String,
    end_date: String,
    date_booked: String,
    status: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        BookingResponse {
            booking_id: b.booking_id,
            listing_id: b.listing_id,
            user_id: b.user_id,
            start_date: b.start_date.format("%Y-%m-%d").to_string(),
            end_date: b.end_date.format("%Y-%m-%d").to_string(),
            date_booked: b.date_booked.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: b.status.as_str().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct UserBookingResponse {
    booking_id: i64,
    listing_id: i64,
    start_date: String,
    end_date: String,
    date_booked: String,
    status: String,
    description: String,
    location: String,
    price: i64,
}

impl From<UserBooking> for UserBookingResponse {
    fn from(b: UserBooking) -> Self {
        UserBookingResponse {
            booking_id: b.booking_id,
            listing_id: b.listing_id,
            start_date: b.start_date.format("%Y-%m-%d").to_string(),
            end_date: b.end_date.format("%Y-%m-%d").to_string(),
            date_booked: b.date_booked.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: b.status.as_str().to_string(),
            description: b.description,
            location: b.location,
            price: b.price,
        }
    }
}

#[derive(Serialize)]
pub struct BookingListResponse {
    total_booking: usize,
    booking: Vec<BookingResponse>,
}

fn booking_list(bookings: Vec<Booking>) -> BookingListResponse {
    let booking: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    BookingListResponse {
        total_booking: booking.len(),
        booking,
    }
}

// POST /api/v1/booking
#[derive(Deserialize)]
pub struct NewBookingRequest {
    pub listing_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let booking = {
        let db = state.db.lock().unwrap();
        lifecycle::request_booking(&db, req.listing_id, &user_id, req.start_date, req.end_date)?
    };

    tracing::info!(
        booking_id = booking.booking_id,
        listing_id = booking.listing_id,
        "booking requested"
    );
    Ok(Json(booking.into()))
}

// GET /api/v1/user/booking
#[derive(Serialize)]
pub struct UserBookingListResponse {
    total_booking: usize,
    booking: Vec<UserBookingResponse>,
}

pub async fn user_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserBookingListResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::bookings_for_user(&db, &user_id)?
    };

    let booking: Vec<UserBookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(Json(UserBookingListResponse {
        total_booking: booking.len(),
        booking,
    }))
}

// GET /api/v1/booking/:listing_id
pub async fn pending_for_listing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(listing_id): Path<i64>,
) -> Result<Json<BookingListResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        lifecycle::pending_for_listing(&db, listing_id, &user_id)?
    };
    Ok(Json(booking_list(bookings)))
}

// GET /api/v1/confirmed/:listing_id
pub async fn confirmed_for_listing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(listing_id): Path<i64>,
) -> Result<Json<BookingListResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        lifecycle::confirmed_for_listing(&db, listing_id, &user_id)?
    };
    Ok(Json(booking_list(bookings)))
}

// GET /api/v1/declined/:listing_id
pub async fn declined_for_listing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(listing_id): Path<i64>,
) -> Result<Json<BookingListResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        lifecycle::declined_for_listing(&db, listing_id, &user_id)?
    };
    Ok(Json(booking_list(bookings)))
}

// GET /api/v1/date/:listing_id (public availability view)
#[derive(Serialize)]
pub struct BookedDatesResponse {
    total_booking: usize,
    date: Vec<BookingResponse>,
}

pub async fn booked_dates(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<i64>,
) -> Result<Json<BookedDatesResponse>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        lifecycle::confirmed_dates(&db, listing_id)?
    };

    let date: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    Ok(Json(BookedDatesResponse {
        total_booking: date.len(),
        date,
    }))
}

// PUT /api/v1/confirm/:booking_id
#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let booking = {
        let db = state.db.lock().unwrap();
        lifecycle::confirm_booking(&db, booking_id, &user_id, req.start_date, req.end_date)?
    };

    tracing::info!(booking_id, "booking confirmed");
    Ok(Json(booking.into()))
}

// PUT /api/v1/decline/:booking_id
pub async fn decline_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let booking = {
        let db = state.db.lock().unwrap();
        lifecycle::decline_booking(&db, booking_id, &user_id)?
    };

    tracing::info!(booking_id, "booking declined");
    Ok(Json(booking.into()))
}

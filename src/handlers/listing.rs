use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::authenticate;
use crate::models::Listing;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ListingResponse {
    listing_id: i64,
    user_id: String,
    description: String,
    location: String,
    price: i64,
    created_at: String,
}

impl From<Listing> for ListingResponse {
    fn from(l: Listing) -> Self {
        ListingResponse {
            listing_id: l.listing_id,
            user_id: l.user_id,
            description: l.description,
            location: l.location,
            price: l.price,
            created_at: l.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ListingListResponse {
    total_listing: usize,
    listing: Vec<ListingResponse>,
}

fn listing_list(listings: Vec<Listing>) -> ListingListResponse {
    let listing: Vec<ListingResponse> = listings.into_iter().map(Into::into).collect();
    ListingListResponse {
        total_listing: listing.len(),
        listing,
    }
}

// POST /api/v1/listing
#[derive(Deserialize)]
pub struct NewListingRequest {
    pub description: String,
    pub location: String,
    pub price: i64,
}

pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewListingRequest>,
) -> Result<Json<ListingResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let listing = {
        let db = state.db.lock().unwrap();
        queries::create_listing(&db, &user_id, &req.description, &req.location, req.price)?
    };

    tracing::info!(listing_id = listing.listing_id, "listing created");
    Ok(Json(listing.into()))
}

// GET /api/v1/listing
pub async fn all_listings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListingListResponse>, AppError> {
    let listings = {
        let db = state.db.lock().unwrap();
        queries::all_listings(&db)?
    };
    Ok(Json(listing_list(listings)))
}

// GET /api/v1/listing/:listing_id
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<i64>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = {
        let db = state.db.lock().unwrap();
        queries::get_listing(&db, listing_id)?
    };

    match listing {
        Some(listing) => Ok(Json(listing.into())),
        None => Err(AppError::NotFound(format!("listing {listing_id}"))),
    }
}

// GET /api/v1/user/listing
pub async fn user_listings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ListingListResponse>, AppError> {
    let user_id = authenticate(&state, &headers).await?;

    let listings = {
        let db = state.db.lock().unwrap();
        queries::listings_for_user(&db, &user_id)?
    };
    Ok(Json(listing_list(listings)))
}

// GET /api/v1/location?location=
#[derive(Deserialize)]
pub struct LocationQuery {
    pub location: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<ListingListResponse>, AppError> {
    let listings = {
        let db = state.db.lock().unwrap();
        queries::search_listings(&db, &query.location)?
    };
    Ok(Json(listing_list(listings)))
}

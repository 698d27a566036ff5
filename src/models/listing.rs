use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub listing_id: i64,
    pub user_id: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub created_at: NaiveDateTime,
}

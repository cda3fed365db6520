use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SeatMap {
    pub id: String,
    pub venue_image_ref: String,
    pub image_width: i32,
    pub image_height: i32,
    pub is_frozen: bool,
    pub created_at: DateTime<Utc>,
}

impl SeatMap {
    pub fn new(venue_image_ref: String, image_width: i32, image_height: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            venue_image_ref,
            image_width,
            image_height,
            is_frozen: false,
            created_at: Utc::now(),
        }
    }
}

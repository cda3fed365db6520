use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PriceCategory {
    pub id: String,
    pub seat_map_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub color_hint: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewCategoryParams {
    pub seat_map_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub color_hint: String,
    pub description: Option<String>,
}

impl PriceCategory {
    pub fn new(params: NewCategoryParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            seat_map_id: params.seat_map_id,
            name: params.name,
            unit_price_cents: params.unit_price_cents,
            color_hint: params.color_hint,
            description: params.description,
            created_at: Utc::now(),
        }
    }
}

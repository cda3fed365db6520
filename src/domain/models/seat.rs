use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A placed seat. Position is stored in normalized space ([0,100] per axis,
/// a percentage of the chart image) so the same seat renders correctly at
/// any display resolution.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Seat {
    pub id: String,
    pub seat_map_id: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub label: String,
    #[sqlx(rename = "seat_row")]
    pub row: Option<String>,
    #[sqlx(rename = "seat_section")]
    pub section: Option<String>,
    pub category_id: String,
    pub is_accessible: bool,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewSeatParams {
    pub seat_map_id: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub label: String,
    pub row: Option<String>,
    pub section: Option<String>,
    pub category_id: String,
    pub is_accessible: bool,
    pub is_blocked: bool,
}

impl Seat {
    pub fn new(params: NewSeatParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            seat_map_id: params.seat_map_id,
            pos_x: params.pos_x,
            pos_y: params.pos_y,
            label: params.label,
            row: params.row,
            section: params.section,
            category_id: params.category_id,
            is_accessible: params.is_accessible,
            is_blocked: params.is_blocked,
            created_at: Utc::now(),
        }
    }
}

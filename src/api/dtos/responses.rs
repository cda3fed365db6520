use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::{
    category::PriceCategory, reservation::SeatStatus, seat::Seat, seat_map::SeatMap,
};

#[derive(Serialize)]
pub struct SeatMapDetailResponse {
    pub map: SeatMap,
    pub categories: Vec<PriceCategory>,
    pub seats: Vec<Seat>,
}

#[derive(Serialize)]
pub struct BulkStatusResponse {
    pub seat_map_id: String,
    pub statuses: HashMap<String, SeatStatus>,
}

#[derive(Serialize)]
pub struct SeatStatusResponse {
    pub seat_id: String,
    pub status: SeatStatus,
}

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub seat_map_id: String,
    pub max_seats: i32,
}

use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateSeatMapRequest {
    pub file_name: String,
    pub content_type: String,
    pub image_base64: String,
    pub image_width: i32,
    pub image_height: i32,
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub unit_price_cents: i64,
    pub color_hint: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct PlaceSeatRequest {
    pub pixel_x: f64,
    pub pixel_y: f64,
    pub category_id: String,
    pub label: String,
    pub row: Option<String>,
    pub section: Option<String>,
    pub is_accessible: Option<bool>,
    pub is_blocked: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateSeatRequest {
    pub pixel_x: Option<f64>,
    pub pixel_y: Option<f64>,
    pub label: Option<String>,
    pub row: Option<String>,
    pub section: Option<String>,
    pub category_id: Option<String>,
    pub is_accessible: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    /// Seats-per-checkout cap supplied by the event records; the service
    /// default applies when absent.
    pub max_seats: Option<i32>,
}

#[derive(Deserialize)]
pub struct ReserveSeatRequest {
    /// Organizer-side token identifying the reservation, so it can later
    /// be released or committed. Generated when absent.
    pub holder_token: Option<String>,
}

#[derive(Deserialize)]
pub struct ReleaseReservationRequest {
    pub holder_token: String,
}

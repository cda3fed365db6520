use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub image_service_url: String,
    pub image_service_token: String,
    pub checkout_service_url: String,
    pub checkout_service_token: String,
    pub hold_ttl_secs: i64,
    pub max_seats_per_selection: i32,
    pub sweep_interval_secs: u64,
    pub seat_overlap_epsilon: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            image_service_url: env::var("IMAGE_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1/images".to_string()),
            image_service_token: env::var("IMAGE_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            checkout_service_url: env::var("CHECKOUT_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8200/api/v1/checkouts".to_string()),
            checkout_service_token: env::var("CHECKOUT_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            hold_ttl_secs: env::var("HOLD_TTL_SECS").unwrap_or_else(|_| "300".to_string()).parse().expect("HOLD_TTL_SECS must be a number"),
            max_seats_per_selection: env::var("MAX_SEATS_PER_SELECTION").unwrap_or_else(|_| "8".to_string()).parse().expect("MAX_SEATS_PER_SELECTION must be a number"),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS").unwrap_or_else(|_| "30".to_string()).parse().expect("SWEEP_INTERVAL_SECS must be a number"),
            seat_overlap_epsilon: env::var("SEAT_OVERLAP_EPSILON").unwrap_or_else(|_| "0.5".to_string()).parse().expect("SEAT_OVERLAP_EPSILON must be a number"),
        }
    }
}

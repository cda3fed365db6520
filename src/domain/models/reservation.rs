use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Live sale state of a single seat, keyed by (seat_map_id, seat_id).
/// This record is the only shared mutable resource in the subsystem; every
/// write to it goes through a single conditional UPDATE so concurrent
/// callers can never interleave inside a read-decide-write window.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SeatState {
    pub seat_map_id: String,
    pub seat_id: String,
    pub status: String,
    pub holder_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SeatState {
    /// An expired buyer hold is treated as released on every read path,
    /// whether or not the sweeper has reclaimed the row yet.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SeatStatus {
        match self.parsed_status() {
            SeatStatus::Held if self.is_expired(now) => SeatStatus::Available,
            other => other,
        }
    }

    pub fn parsed_status(&self) -> SeatStatus {
        SeatStatus::from_db(&self.status)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Held,
    Reserved,
    Sold,
    Blocked,
}

impl SeatStatus {
    pub fn db_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "AVAILABLE",
            SeatStatus::Held => "HELD",
            SeatStatus::Reserved => "RESERVED",
            SeatStatus::Sold => "SOLD",
            SeatStatus::Blocked => "BLOCKED",
        }
    }

    pub fn from_db(s: &str) -> SeatStatus {
        match s {
            "HELD" => SeatStatus::Held,
            "RESERVED" => SeatStatus::Reserved,
            "SOLD" => SeatStatus::Sold,
            "BLOCKED" => SeatStatus::Blocked,
            _ => SeatStatus::Available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Held => "held",
            SeatStatus::Reserved => "reserved",
            SeatStatus::Sold => "sold",
            SeatStatus::Blocked => "blocked",
        }
    }
}

/// A granted claim on a seat. `expires_at` is `None` for organizer
/// reservations, which never expire.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Hold {
    pub seat_map_id: String,
    pub seat_id: String,
    pub holder_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

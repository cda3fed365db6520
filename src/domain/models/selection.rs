use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// One buyer's in-progress selection. The session's held seats are exactly
/// the unexpired holds carrying its `holder_token`; there is no second copy
/// of the held-set, so expiring holds empty the session automatically.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SelectionSession {
    pub id: String,
    pub seat_map_id: String,
    pub holder_token: String,
    pub max_seats: i32,
    pub created_at: DateTime<Utc>,
}

impl SelectionSession {
    pub fn new(seat_map_id: String, max_seats: i32) -> Self {
        let holder_token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            seat_map_id,
            holder_token,
            max_seats,
            created_at: Utc::now(),
        }
    }
}

use crate::domain::{models::reservation::SeatState, ports::ReservationStore};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Postgres variant of the atomic keyed store. Row-level locking makes each
/// conditional UPDATE a serialized check-and-set; no explicit FOR UPDATE is
/// needed because the transition never spans more than one statement.
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn try_claim(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let status = if expires_at.is_some() { "HELD" } else { "RESERVED" };
        let result = sqlx::query(
            "UPDATE seat_states
             SET status = $1, holder_token = $2, expires_at = $3, updated_at = $4
             WHERE seat_map_id = $5 AND seat_id = $6
               AND (status = 'AVAILABLE' OR (status = 'HELD' AND expires_at <= $7))",
        )
        .bind(status)
        .bind(holder_token)
        .bind(expires_at)
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn release(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE seat_states
             SET status = 'AVAILABLE', holder_token = NULL, expires_at = NULL, updated_at = $1
             WHERE seat_map_id = $2 AND seat_id = $3 AND holder_token = $4
               AND status IN ('HELD', 'RESERVED')",
        )
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .bind(holder_token)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn commit_sale(
        &self,
        map_id: &str,
        seat_id: &str,
        holder_token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE seat_states
             SET status = 'SOLD', holder_token = NULL, expires_at = NULL, updated_at = $1
             WHERE seat_map_id = $2 AND seat_id = $3 AND holder_token = $4
               AND (status = 'RESERVED' OR (status = 'HELD' AND expires_at > $5))",
        )
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .bind(holder_token)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_blocked(&self, map_id: &str, seat_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let result = sqlx::query(
            "UPDATE seat_states
             SET status = 'BLOCKED', holder_token = NULL, expires_at = NULL, updated_at = $1
             WHERE seat_map_id = $2 AND seat_id = $3
               AND (status = 'AVAILABLE' OR (status = 'HELD' AND expires_at <= $4))",
        )
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 1 {
            sqlx::query("UPDATE seats SET is_blocked = TRUE WHERE seat_map_id = $1 AND id = $2")
                .bind(map_id)
                .bind(seat_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_unblocked(&self, map_id: &str, seat_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let result = sqlx::query(
            "UPDATE seat_states
             SET status = 'AVAILABLE', holder_token = NULL, expires_at = NULL, updated_at = $1
             WHERE seat_map_id = $2 AND seat_id = $3 AND status = 'BLOCKED'",
        )
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 1 {
            sqlx::query("UPDATE seats SET is_blocked = FALSE WHERE seat_map_id = $1 AND id = $2")
                .bind(map_id)
                .bind(seat_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE seat_states
             SET status = 'AVAILABLE', holder_token = NULL, expires_at = NULL, updated_at = $1
             WHERE status = 'HELD' AND expires_at <= $2",
        )
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn find_state(&self, map_id: &str, seat_id: &str) -> Result<Option<SeatState>, AppError> {
        sqlx::query_as::<_, SeatState>(
            "SELECT * FROM seat_states WHERE seat_map_id = $1 AND seat_id = $2",
        )
        .bind(map_id)
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_states(&self, map_id: &str) -> Result<Vec<SeatState>, AppError> {
        sqlx::query_as::<_, SeatState>(
            "SELECT * FROM seat_states WHERE seat_map_id = $1 ORDER BY seat_id ASC",
        )
        .bind(map_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_held_by(
        &self,
        map_id: &str,
        holder_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatState>, AppError> {
        sqlx::query_as::<_, SeatState>(
            "SELECT * FROM seat_states
             WHERE seat_map_id = $1 AND holder_token = $2 AND status = 'HELD' AND expires_at > $3
             ORDER BY seat_id ASC",
        )
        .bind(map_id)
        .bind(holder_token)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}

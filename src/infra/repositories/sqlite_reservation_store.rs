use crate::domain::{models::reservation::SeatState, ports::ReservationStore};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Every transition is one conditional UPDATE; the WHERE clause carries the
/// legal source states, so concurrent callers serialize on the row write
/// and at most one of them sees `rows_affected == 1`.
pub struct SqliteReservationStore {
    pool: SqlitePool,
}

impl SqliteReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for SqliteReservationStore {
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
             SET status = ?, holder_token = ?, expires_at = ?, updated_at = ?
             WHERE seat_map_id = ? AND seat_id = ?
               AND (status = 'AVAILABLE' OR (status = 'HELD' AND expires_at <= ?))",
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
             SET status = 'AVAILABLE', holder_token = NULL, expires_at = NULL, updated_at = ?
             WHERE seat_map_id = ? AND seat_id = ? AND holder_token = ?
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
             SET status = 'SOLD', holder_token = NULL, expires_at = NULL, updated_at = ?
             WHERE seat_map_id = ? AND seat_id = ? AND holder_token = ?
               AND (status = 'RESERVED' OR (status = 'HELD' AND expires_at > ?))",
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
             SET status = 'BLOCKED', holder_token = NULL, expires_at = NULL, updated_at = ?
             WHERE seat_map_id = ? AND seat_id = ?
               AND (status = 'AVAILABLE' OR (status = 'HELD' AND expires_at <= ?))",
        )
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 1 {
            sqlx::query("UPDATE seats SET is_blocked = 1 WHERE seat_map_id = ? AND id = ?")
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
             SET status = 'AVAILABLE', holder_token = NULL, expires_at = NULL, updated_at = ?
             WHERE seat_map_id = ? AND seat_id = ? AND status = 'BLOCKED'",
        )
        .bind(now)
        .bind(map_id)
        .bind(seat_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 1 {
            sqlx::query("UPDATE seats SET is_blocked = 0 WHERE seat_map_id = ? AND id = ?")
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
             SET status = 'AVAILABLE', holder_token = NULL, expires_at = NULL, updated_at = ?
             WHERE status = 'HELD' AND expires_at <= ?",
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
            "SELECT * FROM seat_states WHERE seat_map_id = ? AND seat_id = ?",
        )
        .bind(map_id)
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_states(&self, map_id: &str) -> Result<Vec<SeatState>, AppError> {
        sqlx::query_as::<_, SeatState>(
            "SELECT * FROM seat_states WHERE seat_map_id = ? ORDER BY seat_id ASC",
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
             WHERE seat_map_id = ? AND holder_token = ? AND status = 'HELD' AND expires_at > ?
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

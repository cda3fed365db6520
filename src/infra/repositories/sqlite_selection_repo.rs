use crate::domain::{models::selection::SelectionSession, ports::SelectionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSelectionRepo {
    pool: SqlitePool,
}

impl SqliteSelectionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SelectionRepository for SqliteSelectionRepo {
    async fn create(&self, session: &SelectionSession) -> Result<SelectionSession, AppError> {
        sqlx::query_as::<_, SelectionSession>(
            "INSERT INTO selection_sessions (id, seat_map_id, holder_token, max_seats, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(&session.id)
        .bind(&session.seat_map_id)
        .bind(&session.holder_token)
        .bind(session.max_seats)
        .bind(session.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SelectionSession>, AppError> {
        sqlx::query_as::<_, SelectionSession>("SELECT * FROM selection_sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM selection_sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}

use crate::domain::{models::selection::SelectionSession, ports::SelectionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresSelectionRepo {
    pool: PgPool,
}

impl PostgresSelectionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SelectionRepository for PostgresSelectionRepo {
    async fn create(&self, session: &SelectionSession) -> Result<SelectionSession, AppError> {
        sqlx::query_as::<_, SelectionSession>(
            "INSERT INTO selection_sessions (id, seat_map_id, holder_token, max_seats, created_at)
             VALUES ($1, $2, $3, $4, $5)
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
        sqlx::query_as::<_, SelectionSession>("SELECT * FROM selection_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM selection_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}

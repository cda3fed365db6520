use crate::domain::{
    models::{category::PriceCategory, seat::Seat, seat_map::SeatMap},
    ports::SeatMapRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresSeatMapRepo {
    pool: PgPool,
}

impl PostgresSeatMapRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatMapRepository for PostgresSeatMapRepo {
    async fn create(&self, map: &SeatMap) -> Result<SeatMap, AppError> {
        sqlx::query_as::<_, SeatMap>(
            "INSERT INTO seat_maps (id, venue_image_ref, image_width, image_height, is_frozen, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&map.id)
        .bind(&map.venue_image_ref)
        .bind(map.image_width)
        .bind(map.image_height)
        .bind(map.is_frozen)
        .bind(map.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SeatMap>, AppError> {
        sqlx::query_as::<_, SeatMap>("SELECT * FROM seat_maps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn freeze(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE seat_maps SET is_frozen = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Seat map {} not found", id)));
        }
        Ok(())
    }

    async fn add_category(&self, category: &PriceCategory) -> Result<PriceCategory, AppError> {
        sqlx::query_as::<_, PriceCategory>(
            "INSERT INTO price_categories (id, seat_map_id, name, unit_price_cents, color_hint, description, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&category.id)
        .bind(&category.seat_map_id)
        .bind(&category.name)
        .bind(category.unit_price_cents)
        .bind(&category.color_hint)
        .bind(&category.description)
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_category(&self, map_id: &str, category_id: &str) -> Result<Option<PriceCategory>, AppError> {
        sqlx::query_as::<_, PriceCategory>(
            "SELECT * FROM price_categories WHERE seat_map_id = $1 AND id = $2",
        )
        .bind(map_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_categories(&self, map_id: &str) -> Result<Vec<PriceCategory>, AppError> {
        sqlx::query_as::<_, PriceCategory>(
            "SELECT * FROM price_categories WHERE seat_map_id = $1 ORDER BY created_at ASC",
        )
        .bind(map_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn add_seat(&self, seat: &Seat) -> Result<Seat, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Seat>(
            "INSERT INTO seats (id, seat_map_id, pos_x, pos_y, label, seat_row, seat_section, category_id, is_accessible, is_blocked, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(&seat.id)
        .bind(&seat.seat_map_id)
        .bind(seat.pos_x)
        .bind(seat.pos_y)
        .bind(&seat.label)
        .bind(&seat.row)
        .bind(&seat.section)
        .bind(&seat.category_id)
        .bind(seat.is_accessible)
        .bind(seat.is_blocked)
        .bind(seat.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let status = if seat.is_blocked { "BLOCKED" } else { "AVAILABLE" };
        sqlx::query(
            "INSERT INTO seat_states (seat_map_id, seat_id, status, holder_token, expires_at, updated_at)
             VALUES ($1, $2, $3, NULL, NULL, $4)",
        )
        .bind(&seat.seat_map_id)
        .bind(&seat.id)
        .bind(status)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_seat(&self, map_id: &str, seat_id: &str) -> Result<Option<Seat>, AppError> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE seat_map_id = $1 AND id = $2")
            .bind(map_id)
            .bind(seat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_seats(&self, map_id: &str) -> Result<Vec<Seat>, AppError> {
        sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE seat_map_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(map_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn update_seat(&self, seat: &Seat) -> Result<Seat, AppError> {
        sqlx::query_as::<_, Seat>(
            "UPDATE seats
             SET pos_x = $1, pos_y = $2, label = $3, seat_row = $4, seat_section = $5, category_id = $6, is_accessible = $7
             WHERE id = $8 AND seat_map_id = $9
             RETURNING *",
        )
        .bind(seat.pos_x)
        .bind(seat.pos_y)
        .bind(&seat.label)
        .bind(&seat.row)
        .bind(&seat.section)
        .bind(&seat.category_id)
        .bind(seat.is_accessible)
        .bind(&seat.id)
        .bind(&seat.seat_map_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn remove_seat(&self, map_id: &str, seat_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let now = Utc::now();

        let state_result = sqlx::query(
            "DELETE FROM seat_states
             WHERE seat_map_id = $1 AND seat_id = $2
               AND (status IN ('AVAILABLE', 'BLOCKED') OR (status = 'HELD' AND expires_at <= $3))",
        )
        .bind(map_id)
        .bind(seat_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if state_result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM seats WHERE seat_map_id = $1 AND id = $2")
                .bind(map_id)
                .bind(seat_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            return match exists {
                Some(_) => Err(AppError::SeatUnavailable(
                    "cannot remove a seat that is held, reserved or sold".into(),
                )),
                None => Err(AppError::SeatNotFound(seat_id.to_string())),
            };
        }

        sqlx::query("DELETE FROM seats WHERE seat_map_id = $1 AND id = $2")
            .bind(map_id)
            .bind(seat_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}

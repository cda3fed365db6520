use std::sync::Arc;

use tracing::info;

use crate::domain::models::category::{NewCategoryParams, PriceCategory};
use crate::domain::models::seat::{NewSeatParams, Seat};
use crate::domain::models::seat_map::SeatMap;
use crate::domain::ports::{ImageStore, SeatMapRepository};
use crate::domain::services::geometry::{self, ImageSize};
use crate::domain::services::statistics::{compute_statistics, SeatMapStatistics};
use crate::error::AppError;

pub struct SeatAttrs {
    pub label: String,
    pub row: Option<String>,
    pub section: Option<String>,
    pub is_accessible: bool,
    pub is_blocked: bool,
}

#[derive(Default)]
pub struct SeatPatch {
    pub pixel_x: Option<f64>,
    pub pixel_y: Option<f64>,
    pub label: Option<String>,
    pub row: Option<String>,
    pub section: Option<String>,
    pub category_id: Option<String>,
    pub is_accessible: Option<bool>,
}

/// Organizer-facing authoring workflow. All persistent effects go through
/// the seat map repository; the "active tool" of the original chart editor
/// is client state, so every placement request names its category.
pub struct AuthoringService {
    seat_map_repo: Arc<dyn SeatMapRepository>,
    image_store: Arc<dyn ImageStore>,
    overlap_epsilon: f64,
}

impl AuthoringService {
    pub fn new(
        seat_map_repo: Arc<dyn SeatMapRepository>,
        image_store: Arc<dyn ImageStore>,
        overlap_epsilon: f64,
    ) -> Self {
        Self {
            seat_map_repo,
            image_store,
            overlap_epsilon,
        }
    }

    /// Uploads the chart image to the storage collaborator and creates the
    /// map. The intrinsic pixel size recorded here anchors all later
    /// pixel-to-normalized conversions.
    pub async fn create_map(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        image_width: i32,
        image_height: i32,
    ) -> Result<SeatMap, AppError> {
        if image_width <= 0 || image_height <= 0 {
            return Err(AppError::Validation(format!(
                "Invalid image size {}x{}",
                image_width, image_height
            )));
        }

        let image_ref = self.image_store.store(file_name, content_type, bytes).await?;
        let map = SeatMap::new(image_ref, image_width, image_height);
        let created = self.seat_map_repo.create(&map).await?;
        info!("Seat map {} created ({}x{})", created.id, image_width, image_height);
        Ok(created)
    }

    pub async fn add_category(
        &self,
        map_id: &str,
        name: String,
        unit_price_cents: i64,
        color_hint: String,
        description: Option<String>,
    ) -> Result<PriceCategory, AppError> {
        self.require_unfrozen(map_id).await?;

        if name.trim().is_empty() {
            return Err(AppError::Validation("Category name must not be empty".into()));
        }
        if unit_price_cents < 0 {
            return Err(AppError::Validation("Category price must be non-negative".into()));
        }

        let category = PriceCategory::new(NewCategoryParams {
            seat_map_id: map_id.to_string(),
            name,
            unit_price_cents,
            color_hint,
            description,
        });
        self.seat_map_repo.add_category(&category).await
    }

    /// Places a seat at a pixel position on the chart image. The position
    /// is normalized against the map's intrinsic size before storage.
    pub async fn place_seat(
        &self,
        map_id: &str,
        pixel_x: f64,
        pixel_y: f64,
        category_id: &str,
        attrs: SeatAttrs,
    ) -> Result<Seat, AppError> {
        let map = self.require_unfrozen(map_id).await?;

        self.seat_map_repo
            .find_category(map_id, category_id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown category {}", category_id)))?;

        let image = ImageSize::new(map.image_width as f64, map.image_height as f64);
        let (pos_x, pos_y) = geometry::to_normalized(pixel_x, pixel_y, image)?;

        self.check_overlap(map_id, pos_x, pos_y, None).await?;

        let seat = Seat::new(NewSeatParams {
            seat_map_id: map_id.to_string(),
            pos_x,
            pos_y,
            label: attrs.label,
            row: attrs.row,
            section: attrs.section,
            category_id: category_id.to_string(),
            is_accessible: attrs.is_accessible,
            is_blocked: attrs.is_blocked,
        });
        let created = self.seat_map_repo.add_seat(&seat).await?;
        info!("Seat {} placed at ({:.2}, {:.2}) on map {}", created.id, pos_x, pos_y, map_id);
        Ok(created)
    }

    pub async fn update_seat(
        &self,
        map_id: &str,
        seat_id: &str,
        patch: SeatPatch,
    ) -> Result<Seat, AppError> {
        let map = self.require_unfrozen(map_id).await?;

        let mut seat = self
            .seat_map_repo
            .find_seat(map_id, seat_id)
            .await?
            .ok_or_else(|| AppError::SeatNotFound(seat_id.to_string()))?;

        match (patch.pixel_x, patch.pixel_y) {
            (Some(px), Some(py)) => {
                let image = ImageSize::new(map.image_width as f64, map.image_height as f64);
                let (pos_x, pos_y) = geometry::to_normalized(px, py, image)?;
                self.check_overlap(map_id, pos_x, pos_y, Some(seat_id)).await?;
                seat.pos_x = pos_x;
                seat.pos_y = pos_y;
            }
            (None, None) => {}
            _ => {
                return Err(AppError::Validation(
                    "pixel_x and pixel_y must be supplied together".into(),
                ));
            }
        }

        if let Some(category_id) = patch.category_id {
            self.seat_map_repo
                .find_category(map_id, &category_id)
                .await?
                .ok_or_else(|| AppError::Validation(format!("Unknown category {}", category_id)))?;
            seat.category_id = category_id;
        }

        if let Some(label) = patch.label {
            seat.label = label;
        }
        if let Some(row) = patch.row {
            seat.row = if row.is_empty() { None } else { Some(row) };
        }
        if let Some(section) = patch.section {
            seat.section = if section.is_empty() { None } else { Some(section) };
        }
        if let Some(is_accessible) = patch.is_accessible {
            seat.is_accessible = is_accessible;
        }

        self.seat_map_repo.update_seat(&seat).await
    }

    pub async fn remove_seat(&self, map_id: &str, seat_id: &str) -> Result<(), AppError> {
        self.require_unfrozen(map_id).await?;
        self.seat_map_repo.remove_seat(map_id, seat_id).await?;
        info!("Seat {} removed from map {}", seat_id, map_id);
        Ok(())
    }

    /// Freezes the map once an event using it goes on sale. Idempotent;
    /// every authoring mutation is rejected afterwards.
    pub async fn publish(&self, map_id: &str) -> Result<SeatMap, AppError> {
        let map = self.require_map(map_id).await?;
        if !map.is_frozen {
            self.seat_map_repo.freeze(map_id).await?;
            info!("Seat map {} published", map_id);
        }
        self.require_map(map_id).await
    }

    pub async fn statistics(&self, map_id: &str) -> Result<SeatMapStatistics, AppError> {
        self.require_map(map_id).await?;
        let seats = self.seat_map_repo.list_seats(map_id).await?;
        let categories = self.seat_map_repo.list_categories(map_id).await?;
        Ok(compute_statistics(&seats, &categories))
    }

    pub async fn map_detail(
        &self,
        map_id: &str,
    ) -> Result<(SeatMap, Vec<PriceCategory>, Vec<Seat>), AppError> {
        let map = self.require_map(map_id).await?;
        let categories = self.seat_map_repo.list_categories(map_id).await?;
        let seats = self.seat_map_repo.list_seats(map_id).await?;
        Ok((map, categories, seats))
    }

    async fn require_map(&self, map_id: &str) -> Result<SeatMap, AppError> {
        self.seat_map_repo
            .find_by_id(map_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Seat map {} not found", map_id)))
    }

    async fn require_unfrozen(&self, map_id: &str) -> Result<SeatMap, AppError> {
        let map = self.require_map(map_id).await?;
        if map.is_frozen {
            return Err(AppError::MapFrozen);
        }
        Ok(map)
    }

    async fn check_overlap(
        &self,
        map_id: &str,
        pos_x: f64,
        pos_y: f64,
        exclude_seat_id: Option<&str>,
    ) -> Result<(), AppError> {
        let seats = self.seat_map_repo.list_seats(map_id).await?;
        for other in &seats {
            if exclude_seat_id == Some(other.id.as_str()) {
                continue;
            }
            if geometry::positions_overlap(pos_x, pos_y, other.pos_x, other.pos_y, self.overlap_epsilon) {
                return Err(AppError::Validation(format!(
                    "Position ({:.2}, {:.2}) overlaps seat {} at ({:.2}, {:.2})",
                    pos_x, pos_y, other.label, other.pos_x, other.pos_y
                )));
            }
        }
        Ok(())
    }
}

use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{CreateCategoryRequest, CreateSeatMapRequest, PlaceSeatRequest, UpdateSeatRequest},
    responses::SeatMapDetailResponse,
};
use crate::domain::services::authoring::{SeatAttrs, SeatPatch};
use crate::error::AppError;
use std::sync::Arc;
use base64::{engine::general_purpose, Engine as _};
use tracing::info;

pub async fn create_seat_map(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSeatMapRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_seat_map: Uploading chart image {}", payload.file_name);

    let bytes = general_purpose::STANDARD
        .decode(&payload.image_base64)
        .map_err(|_| AppError::Validation("image_base64 is not valid base64".into()))?;

    let map = state
        .authoring
        .create_map(
            &payload.file_name,
            &payload.content_type,
            &bytes,
            payload.image_width,
            payload.image_height,
        )
        .await?;

    Ok(Json(map))
}

pub async fn get_seat_map(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (map, categories, seats) = state.authoring.map_detail(&map_id).await?;
    Ok(Json(SeatMapDetailResponse { map, categories, seats }))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = state
        .authoring
        .add_category(
            &map_id,
            payload.name,
            payload.unit_price_cents,
            payload.color_hint,
            payload.description,
        )
        .await?;
    Ok(Json(category))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (_, categories, _) = state.authoring.map_detail(&map_id).await?;
    Ok(Json(categories))
}

pub async fn place_seat(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
    Json(payload): Json<PlaceSeatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let seat = state
        .authoring
        .place_seat(
            &map_id,
            payload.pixel_x,
            payload.pixel_y,
            &payload.category_id,
            SeatAttrs {
                label: payload.label,
                row: payload.row,
                section: payload.section,
                is_accessible: payload.is_accessible.unwrap_or(false),
                is_blocked: payload.is_blocked.unwrap_or(false),
            },
        )
        .await?;
    Ok(Json(seat))
}

pub async fn update_seat(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSeatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let seat = state
        .authoring
        .update_seat(
            &map_id,
            &seat_id,
            SeatPatch {
                pixel_x: payload.pixel_x,
                pixel_y: payload.pixel_y,
                label: payload.label,
                row: payload.row,
                section: payload.section,
                category_id: payload.category_id,
                is_accessible: payload.is_accessible,
            },
        )
        .await?;
    Ok(Json(seat))
}

pub async fn delete_seat(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.authoring.remove_seat(&map_id, &seat_id).await?;
    Ok(Json(serde_json::json!({"status": "removed"})))
}

pub async fn publish_map(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let map = state.authoring.publish(&map_id).await?;
    info!("Seat map published: {}", map.id);
    Ok(Json(map))
}

pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.authoring.statistics(&map_id).await?;
    Ok(Json(stats))
}

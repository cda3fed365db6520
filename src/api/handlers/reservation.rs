use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{ReleaseReservationRequest, ReserveSeatRequest};
use crate::api::dtos::responses::{BulkStatusResponse, SeatStatusResponse};
use crate::error::AppError;
use std::sync::Arc;
use rand::{distributions::Alphanumeric, Rng};

pub async fn bulk_status(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state
        .seat_map_repo
        .find_by_id(&map_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Seat map {} not found", map_id)))?;

    let statuses = state.reservation.bulk_status(&map_id).await?;
    Ok(Json(BulkStatusResponse { seat_map_id: map_id, statuses }))
}

pub async fn seat_status(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let status = state.reservation.status_of(&map_id, &seat_id).await?;
    Ok(Json(SeatStatusResponse { seat_id, status }))
}

pub async fn block_seat(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.reservation.block_seat(&map_id, &seat_id).await?;
    Ok(Json(serde_json::json!({"status": "blocked"})))
}

pub async fn unblock_seat(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.reservation.unblock_seat(&map_id, &seat_id).await?;
    Ok(Json(serde_json::json!({"status": "unblocked"})))
}

/// Organizer comp hold, exempt from expiry. Returns the hold so the
/// organizer can keep its token for later release or commit.
pub async fn reserve_seat(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
    Json(payload): Json<ReserveSeatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let holder_token = payload.holder_token.unwrap_or_else(|| {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect()
    });

    let hold = state.reservation.reserve(&map_id, &seat_id, &holder_token).await?;
    Ok(Json(hold))
}

pub async fn release_reservation(
    State(state): State<Arc<AppState>>,
    Path((map_id, seat_id)): Path<(String, String)>,
    Json(payload): Json<ReleaseReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .reservation
        .release_hold(&map_id, &seat_id, &payload.holder_token)
        .await?;
    Ok(Json(serde_json::json!({"status": "released"})))
}

use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateSessionRequest;
use crate::api::dtos::responses::SessionCreatedResponse;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<String>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.selection.create_session(&map_id, payload.max_seats).await?;
    info!("Selection session {} opened on map {}", session.id, map_id);
    Ok(Json(SessionCreatedResponse {
        session_id: session.id,
        seat_map_id: session.seat_map_id,
        max_seats: session.max_seats,
    }))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.selection.summary(&session_id).await?;
    Ok(Json(summary))
}

pub async fn select_seat(
    State(state): State<Arc<AppState>>,
    Path((session_id, seat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.selection.select_seat(&session_id, &seat_id).await?;
    Ok(Json(summary))
}

pub async fn deselect_seat(
    State(state): State<Arc<AppState>>,
    Path((session_id, seat_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.selection.deselect_seat(&session_id, &seat_id).await?;
    Ok(Json(summary))
}

pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.selection.checkout(&session_id).await?;
    Ok(Json(outcome))
}

pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.selection.cancel_session(&session_id).await?;
    Ok(Json(serde_json::json!({"status": "cancelled"})))
}

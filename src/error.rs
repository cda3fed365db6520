use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Seat not found: {0}")]
    SeatNotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Seat map is frozen")]
    MapFrozen,
    #[error("Seat unavailable: {0}")]
    SeatUnavailable(String),
    #[error("Seat is blocked: {0}")]
    SeatBlocked(String),
    #[error("Hold is owned by another token")]
    NotHolder,
    #[error("Hold has expired")]
    HoldExpired,
    #[error("Selection limit of {0} seats reached")]
    SelectionLimit(i32),
    #[error("Upload rejected: {0}")]
    UploadRejected(UploadRejectReason),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejectReason {
    InvalidType,
    TooLarge,
}

impl std::fmt::Display for UploadRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadRejectReason::InvalidType => write!(f, "invalid_type"),
            UploadRejectReason::TooLarge => write!(f, "too_large"),
        }
    }
}

impl AppError {
    /// Stable machine-readable code included in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::NotFound(_) => "not_found",
            AppError::SeatNotFound(_) => "seat_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::MapFrozen => "map_frozen",
            AppError::SeatUnavailable(_) => "seat_unavailable",
            AppError::SeatBlocked(_) => "seat_blocked",
            AppError::NotHolder => "not_holder",
            AppError::HoldExpired => "hold_expired",
            AppError::SelectionLimit(_) => "selection_limit",
            AppError::UploadRejected(_) => "upload_rejected",
            AppError::Internal | AppError::InternalWithMsg(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::SeatNotFound(msg) => (StatusCode::NOT_FOUND, format!("Seat not found: {}", msg)),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MapFrozen => (StatusCode::CONFLICT, "Seat map is frozen".to_string()),
            AppError::SeatUnavailable(msg) => (StatusCode::CONFLICT, format!("Seat unavailable: {}", msg)),
            AppError::SeatBlocked(msg) => (StatusCode::CONFLICT, format!("Seat is blocked: {}", msg)),
            AppError::NotHolder => (StatusCode::FORBIDDEN, "Hold is owned by another token".to_string()),
            AppError::HoldExpired => (StatusCode::GONE, "Hold has expired".to_string()),
            AppError::SelectionLimit(max) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Selection limit of {} seats reached", max),
            ),
            AppError::UploadRejected(reason) => {
                (StatusCode::BAD_REQUEST, format!("Upload rejected: {}", reason))
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

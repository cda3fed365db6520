use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, reservation, seat_map, selection};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Authoring (organizer)
        .route("/api/v1/seat-maps", post(seat_map::create_seat_map))
        .route("/api/v1/seat-maps/{map_id}", get(seat_map::get_seat_map))
        .route("/api/v1/seat-maps/{map_id}/categories", get(seat_map::list_categories).post(seat_map::create_category))
        .route("/api/v1/seat-maps/{map_id}/seats", post(seat_map::place_seat))
        .route("/api/v1/seat-maps/{map_id}/seats/{seat_id}", axum::routing::put(seat_map::update_seat).delete(seat_map::delete_seat))
        .route("/api/v1/seat-maps/{map_id}/publish", post(seat_map::publish_map))
        .route("/api/v1/seat-maps/{map_id}/statistics", get(seat_map::get_statistics))

        // Organizer seat administration
        .route("/api/v1/seat-maps/{map_id}/seats/{seat_id}/block", post(reservation::block_seat))
        .route("/api/v1/seat-maps/{map_id}/seats/{seat_id}/unblock", post(reservation::unblock_seat))
        .route("/api/v1/seat-maps/{map_id}/seats/{seat_id}/reserve", post(reservation::reserve_seat))
        .route("/api/v1/seat-maps/{map_id}/seats/{seat_id}/release-reservation", post(reservation::release_reservation))

        // Rendering / buyer reads
        .route("/api/v1/seat-maps/{map_id}/seat-status", get(reservation::bulk_status))
        .route("/api/v1/seat-maps/{map_id}/seats/{seat_id}/status", get(reservation::seat_status))

        // Buyer selection flow
        .route("/api/v1/seat-maps/{map_id}/sessions", post(selection::create_session))
        .route("/api/v1/sessions/{session_id}", get(selection::get_session).delete(selection::cancel_session))
        .route("/api/v1/sessions/{session_id}/seats/{seat_id}", post(selection::select_seat).delete(selection::deselect_seat))
        .route("/api/v1/sessions/{session_id}/checkout", post(selection::checkout))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

const PNG_BASE64: &str = "aGVsbG8=";

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_json(app: &TestApp, uri: &str, payload: Value) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap()
}

/// Published chart with a "vip" category at 8500 cents and a "stalls"
/// category at 4500, three vip seats and one stalls seat.
async fn setup_chart(app: &TestApp) -> (String, Vec<String>, String) {
    let res = post_json(app, "/api/v1/seat-maps", json!({
        "file_name": "hall.png",
        "content_type": "image/png",
        "image_base64": PNG_BASE64,
        "image_width": 1000,
        "image_height": 1000
    })).await;
    let map_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = post_json(app, &format!("/api/v1/seat-maps/{}/categories", map_id), json!({
        "name": "VIP", "unit_price_cents": 8500, "color_hint": "#d4a017"
    })).await;
    let vip = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = post_json(app, &format!("/api/v1/seat-maps/{}/categories", map_id), json!({
        "name": "Stalls", "unit_price_cents": 4500, "color_hint": "#3b82f6"
    })).await;
    let stalls = parse_body(res).await["id"].as_str().unwrap().to_string();

    let mut vip_seats = Vec::new();
    for i in 0..3 {
        let res = post_json(app, &format!("/api/v1/seat-maps/{}/seats", map_id), json!({
            "pixel_x": 100.0 + i as f64 * 100.0,
            "pixel_y": 100.0,
            "category_id": vip,
            "label": format!("V{}", i + 1)
        })).await;
        vip_seats.push(parse_body(res).await["id"].as_str().unwrap().to_string());
    }

    let res = post_json(app, &format!("/api/v1/seat-maps/{}/seats", map_id), json!({
        "pixel_x": 100.0, "pixel_y": 500.0, "category_id": stalls, "label": "S1"
    })).await;
    let stalls_seat = parse_body(res).await["id"].as_str().unwrap().to_string();

    post_json(app, &format!("/api/v1/seat-maps/{}/publish", map_id), json!({})).await;

    (map_id, vip_seats, stalls_seat)
}

async fn open_session(app: &TestApp, map_id: &str, max_seats: Option<i32>) -> String {
    let payload = match max_seats {
        Some(n) => json!({"max_seats": n}),
        None => json!({}),
    };
    let res = post_json(app, &format!("/api/v1/seat-maps/{}/sessions", map_id), payload).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["session_id"].as_str().unwrap().to_string()
}

async fn select(app: &TestApp, session_id: &str, seat_id: &str) -> axum::response::Response {
    post_json(app, &format!("/api/v1/sessions/{}/seats/{}", session_id, seat_id), json!({})).await
}

#[tokio::test]
async fn test_selection_limit_and_reselect() {
    let app = TestApp::new().await;
    let (map_id, vip_seats, _) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, Some(2)).await;

    let res = select(&app, &session, &vip_seats[0]).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = select(&app, &session, &vip_seats[1]).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["total_price_cents"], 2 * 8500);

    // Third seat is over the cap
    let res = select(&app, &session, &vip_seats[2]).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse_body(res).await["code"], "selection_limit");

    // The cap was enforced before any hold was requested
    let res = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/seat-maps/{}/seats/{}/status", map_id, vip_seats[2]))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["status"], "available");

    // Deselecting frees a slot
    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/sessions/{}/seats/{}", session, vip_seats[0]))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = select(&app, &session, &vip_seats[2]).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_default_limit_from_config() {
    let app = TestApp::new_with(300, 2).await;
    let (map_id, vip_seats, _) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, None).await;

    assert_eq!(select(&app, &session, &vip_seats[0]).await.status(), StatusCode::OK);
    assert_eq!(select(&app, &session, &vip_seats[1]).await.status(), StatusCode::OK);
    assert_eq!(
        select(&app, &session, &vip_seats[2]).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_total_price_tracks_selection_changes() {
    let app = TestApp::new().await;
    let (map_id, vip_seats, stalls_seat) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, None).await;

    select(&app, &session, &vip_seats[0]).await;
    let res = select(&app, &session, &stalls_seat).await;
    assert_eq!(parse_body(res).await["total_price_cents"], 8500 + 4500);

    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/sessions/{}/seats/{}", session, vip_seats[0]))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["total_price_cents"], 4500);

    let res = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/sessions/{}", session))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["seats"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_price_cents"], 4500);
}

#[tokio::test]
async fn test_checkout_sells_all_and_notifies_downstream() {
    let app = TestApp::new().await;
    let (map_id, vip_seats, stalls_seat) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, None).await;

    select(&app, &session, &vip_seats[0]).await;
    select(&app, &session, &stalls_seat).await;

    let res = post_json(&app, &format!("/api/v1/sessions/{}/checkout", session), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["committed"].as_array().unwrap().len(), 2);
    assert_eq!(body["failed"].as_array().unwrap().len(), 0);
    assert_eq!(body["total_price_cents"], 8500 + 4500);
    assert_eq!(body["forwarded"], true);

    // Committed in ascending seat-id order
    let committed_ids: Vec<&str> = body["committed"].as_array().unwrap()
        .iter().map(|c| c["seat_id"].as_str().unwrap()).collect();
    let mut sorted = committed_ids.clone();
    sorted.sort();
    assert_eq!(committed_ids, sorted);

    // Downstream gateway saw exactly this checkout
    let calls = app.checkout_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].session_id, session);
    assert_eq!(calls[0].seat_ids.len(), 2);
    assert_eq!(calls[0].total_price_cents, 8500 + 4500);
    drop(calls);

    // Session is destroyed on completion
    let res = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/sessions/{}", session))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_with_nothing_held_rejected() {
    let app = TestApp::new().await;
    let (map_id, _, _) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, None).await;

    let res = post_json(&app, &format!("/api/v1/sessions/{}/checkout", session), json!({})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_partial_failure_keeps_earlier_sales() {
    let app = TestApp::new().await;
    let (map_id, vip_seats, stalls_seat) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, None).await;

    select(&app, &session, &vip_seats[0]).await;
    select(&app, &session, &stalls_seat).await;

    // Age one hold past its expiry; commit's revalidation must fail it
    // while the other seat still sells.
    sqlx::query("UPDATE seat_states SET expires_at = ? WHERE seat_id = ?")
        .bind(Utc::now() - Duration::minutes(5))
        .bind(&stalls_seat)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = post_json(&app, &format!("/api/v1/sessions/{}/checkout", session), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;

    let committed = body["committed"].as_array().unwrap();
    let failed = body["failed"].as_array().unwrap();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0]["seat_id"], vip_seats[0].as_str());
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["seat_id"], stalls_seat.as_str());
    assert_eq!(failed[0]["code"], "hold_expired");
    assert_eq!(body["total_price_cents"], 8500);

    // The sold seat stays sold; no compensating rollback.
    let res = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/seat-maps/{}/seats/{}/status", map_id, vip_seats[0]))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["status"], "sold");

    // Only the committed seat reached the downstream gateway.
    let calls = app.checkout_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].seat_ids, vec![vip_seats[0].clone()]);
    assert_eq!(calls[0].total_price_cents, 8500);
    drop(calls);

    // Session survives so the buyer can be re-offered the failed seat.
    let res = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/sessions/{}", session))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Re-offer loop: the expired seat is free again, can be re-held and sold.
    let res = select(&app, &session, &stalls_seat).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = post_json(&app, &format!("/api/v1/sessions/{}/checkout", session), json!({})).await;
    let body = parse_body(res).await;
    assert_eq!(body["committed"].as_array().unwrap().len(), 1);
    assert_eq!(body["failed"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_cancel_session_releases_holds() {
    let app = TestApp::new().await;
    let (map_id, vip_seats, _) = setup_chart(&app).await;
    let session = open_session(&app, &map_id, None).await;

    select(&app, &session, &vip_seats[0]).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/sessions/{}", session))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/seat-maps/{}/seats/{}/status", map_id, vip_seats[0]))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await["status"], "available");

    let res = select(&app, &session, &vip_seats[1]).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_requires_known_map() {
    let app = TestApp::new().await;
    let res = post_json(&app, "/api/v1/seat-maps/ghost/sessions", json!({})).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

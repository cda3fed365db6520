mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
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

async fn get(app: &TestApp, uri: &str) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    ).await.unwrap()
}

/// Published chart with one "vip" category at 8500 cents and three seats.
async fn setup_chart(app: &TestApp) -> (String, Vec<String>) {
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
    let cat_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let mut seat_ids = Vec::new();
    for i in 0..3 {
        let res = post_json(app, &format!("/api/v1/seat-maps/{}/seats", map_id), json!({
            "pixel_x": 100.0 + i as f64 * 100.0,
            "pixel_y": 100.0,
            "category_id": cat_id,
            "label": format!("V{}", i + 1)
        })).await;
        assert_eq!(res.status(), StatusCode::OK);
        seat_ids.push(parse_body(res).await["id"].as_str().unwrap().to_string());
    }

    let res = post_json(app, &format!("/api/v1/seat-maps/{}/publish", map_id), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    (map_id, seat_ids)
}

async fn open_session(app: &TestApp, map_id: &str) -> String {
    let res = post_json(app, &format!("/api/v1/seat-maps/{}/sessions", map_id), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["session_id"].as_str().unwrap().to_string()
}

async fn seat_status(app: &TestApp, map_id: &str, seat_id: &str) -> String {
    let res = get(app, &format!("/api/v1/seat-maps/{}/seats/{}/status", map_id, seat_id)).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["status"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_hold_lifecycle() {
    let app = TestApp::new().await;
    let (map_id, seats) = setup_chart(&app).await;
    let seat = &seats[0];

    let buyer_a = open_session(&app, &map_id).await;
    let buyer_b = open_session(&app, &map_id).await;

    // A wins the seat
    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer_a, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["seats"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_price_cents"], 8500);

    assert_eq!(seat_status(&app, &map_id, seat).await, "held");

    // B loses immediately; no queueing
    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer_b, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["code"], "seat_unavailable");

    // A releases, B can now take it
    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/sessions/{}/seats/{}", buyer_a, seat))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(seat_status(&app, &map_id, seat).await, "available");

    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer_b, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_release_is_idempotent_but_guards_other_holders() {
    let app = TestApp::new().await;
    let (map_id, seats) = setup_chart(&app).await;
    let seat = &seats[0];

    let buyer_a = open_session(&app, &map_id).await;
    let buyer_b = open_session(&app, &map_id).await;

    // Releasing a seat that was never held is a no-op
    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/sessions/{}/seats/{}", buyer_a, seat))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer_a, seat), json!({})).await;

    // Double release by the holder is fine
    for _ in 0..2 {
        let res = app.router.clone().oneshot(
            Request::builder().method("DELETE")
                .uri(format!("/api/v1/sessions/{}/seats/{}", buyer_a, seat))
                .body(Body::empty()).unwrap()
        ).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    // B holds the seat; A cannot release it out from under B
    post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer_b, seat), json!({})).await;
    let res = app.router.clone().oneshot(
        Request::builder().method("DELETE")
            .uri(format!("/api/v1/sessions/{}/seats/{}", buyer_a, seat))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(parse_body(res).await["code"], "not_holder");
    assert_eq!(seat_status(&app, &map_id, seat).await, "held");
}

#[tokio::test]
async fn test_blocked_seat_rejects_holds() {
    let app = TestApp::new().await;
    let (map_id, seats) = setup_chart(&app).await;
    let seat = &seats[0];
    let buyer = open_session(&app, &map_id).await;

    let res = post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/block", map_id, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(seat_status(&app, &map_id, seat).await, "blocked");

    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(res).await["code"], "seat_blocked");

    // Blocking twice is a no-op
    let res = post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/block", map_id, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Unblock makes it sellable again
    let res = post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/unblock", map_id, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    // A held seat cannot be blocked
    let res = post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/block", map_id, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_organizer_reservation_never_expires_and_guards_token() {
    let app = TestApp::new().await;
    let (map_id, seats) = setup_chart(&app).await;
    let seat = &seats[0];
    let buyer = open_session(&app, &map_id).await;

    let res = post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/reserve", map_id, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let hold = parse_body(res).await;
    let token = hold["holder_token"].as_str().unwrap().to_string();
    assert!(hold["expires_at"].is_null());

    assert_eq!(seat_status(&app, &map_id, seat).await, "reserved");

    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Wrong token cannot release the reservation
    let res = post_json(
        &app,
        &format!("/api/v1/seat-maps/{}/seats/{}/release-reservation", map_id, seat),
        json!({"holder_token": "someone-else"}),
    ).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = post_json(
        &app,
        &format!("/api/v1/seat-maps/{}/seats/{}/release-reservation", map_id, seat),
        json!({"holder_token": token}),
    ).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(seat_status(&app, &map_id, seat).await, "available");
}

#[tokio::test]
async fn test_sold_seat_is_terminal() {
    let app = TestApp::new().await;
    let (map_id, seats) = setup_chart(&app).await;
    let seat = &seats[0];

    let buyer = open_session(&app, &map_id).await;
    post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer, seat), json!({})).await;
    let res = post_json(&app, &format!("/api/v1/sessions/{}/checkout", buyer), json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(seat_status(&app, &map_id, seat).await, "sold");

    let late_buyer = open_session(&app, &map_id).await;
    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", late_buyer, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/block", map_id, seat), json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bulk_status_reflects_every_state() {
    let app = TestApp::new().await;
    let (map_id, seats) = setup_chart(&app).await;

    // seats[0] held, seats[1] blocked, seats[2] available
    let buyer = open_session(&app, &map_id).await;
    post_json(&app, &format!("/api/v1/sessions/{}/seats/{}", buyer, &seats[0]), json!({})).await;
    post_json(&app, &format!("/api/v1/seat-maps/{}/seats/{}/block", map_id, &seats[1]), json!({})).await;

    let res = get(&app, &format!("/api/v1/seat-maps/{}/seat-status", map_id)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let statuses = body["statuses"].as_object().unwrap();

    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[&seats[0]], "held");
    assert_eq!(statuses[&seats[1]], "blocked");
    assert_eq!(statuses[&seats[2]], "available");
}

#[tokio::test]
async fn test_unknown_seat_and_map() {
    let app = TestApp::new().await;
    let (map_id, _) = setup_chart(&app).await;
    let buyer = open_session(&app, &map_id).await;

    let res = post_json(&app, &format!("/api/v1/sessions/{}/seats/ghost", buyer), json!({})).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(res).await["code"], "seat_not_found");

    let res = get(&app, "/api/v1/seat-maps/ghost/seat-status").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

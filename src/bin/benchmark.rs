use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const DURATION_SECS: u64 = 20;
const BASE_URL: &str = "http://localhost:8000";

// 1x1 transparent PNG, enough to satisfy the image upload.
const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Benchmark Suite".bold().green());
    println!("Target URL: {}", BASE_URL);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    if client.get(format!("{}/health", BASE_URL)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable at localhost:8000. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let (map_id, seat_ids) = setup_seat_map(&client).await;
    let session_id = setup_session(&client, &map_id).await;

    println!("{}", "✅ Data created successfully.".green());
    println!("   Map ID:     {}", map_id);
    println!("   Seats:      {}", seat_ids.len());
    println!("   Session ID: {}", session_id);

    let contended_seat = seat_ids.first().expect("No seats placed").clone();

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/health", BASE_URL),
            body: None,
        },
        Target {
            name: "Bulk Seat Status (Render Read)",
            method: "GET",
            url: format!("{}/api/v1/seat-maps/{}/seat-status", BASE_URL, map_id),
            body: None,
        },
        Target {
            name: "Open Selection Session (Write)",
            method: "POST",
            url: format!("{}/api/v1/seat-maps/{}/sessions", BASE_URL, map_id),
            body: Some(json!({})),
        },
        // Exactly one of these requests can ever win the seat; the rest
        // exercise the conflict path, so a low success rate is expected.
        Target {
            name: "Contended Hold (single seat)",
            method: "POST",
            url: format!("{}/api/v1/sessions/{}/seats/{}", BASE_URL, session_id, contended_seat),
            body: Some(json!({})),
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn setup_seat_map(client: &Client) -> (String, Vec<String>) {
    let res = client.post(format!("{}/api/v1/seat-maps", BASE_URL))
        .json(&json!({
            "file_name": "benchmark-hall.png",
            "content_type": "image/png",
            "image_base64": TINY_PNG_BASE64,
            "image_width": 1000,
            "image_height": 800
        }))
        .send()
        .await
        .expect("Failed to send seat map create request");

    if !res.status().is_success() {
        panic!("Failed to create seat map: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse seat map response");
    let map_id = body["id"].as_str().expect("No map id").to_string();

    let cat_res = client.post(format!("{}/api/v1/seat-maps/{}/categories", BASE_URL, map_id))
        .json(&json!({
            "name": "Stalls",
            "unit_price_cents": 4500,
            "color_hint": "#3b82f6"
        }))
        .send()
        .await
        .expect("Failed to create category");

    if !cat_res.status().is_success() {
        panic!("Failed to create category: status {}", cat_res.status());
    }
    let cat_body: Value = cat_res.json().await.unwrap();
    let category_id = cat_body["id"].as_str().expect("No category id").to_string();

    let mut seat_ids = Vec::new();
    for row in 0..5u8 {
        for num in 0..10u8 {
            let res = client.post(format!("{}/api/v1/seat-maps/{}/seats", BASE_URL, map_id))
                .json(&json!({
                    "pixel_x": 50.0 + num as f64 * 90.0,
                    "pixel_y": 60.0 + row as f64 * 120.0,
                    "category_id": category_id,
                    "label": format!("{}{}", (b'A' + row) as char, num + 1),
                    "row": format!("{}", (b'A' + row) as char)
                }))
                .send()
                .await
                .expect("Failed to place seat");
            if !res.status().is_success() {
                let status = res.status();
                let txt = res.text().await.unwrap_or_default();
                panic!("Failed to place seat. Status: {}. Body: {}", status, txt);
            }
            let seat: Value = res.json().await.unwrap();
            seat_ids.push(seat["id"].as_str().expect("No seat id").to_string());
        }
    }

    let pub_res = client.post(format!("{}/api/v1/seat-maps/{}/publish", BASE_URL, map_id))
        .send()
        .await
        .expect("Failed to publish seat map");
    if !pub_res.status().is_success() {
        panic!("Failed to publish seat map: status {}", pub_res.status());
    }

    (map_id, seat_ids)
}

async fn setup_session(client: &Client, map_id: &str) -> String {
    let res = client.post(format!("{}/api/v1/seat-maps/{}/sessions", BASE_URL, map_id))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to create session");

    if !res.status().is_success() {
        panic!("Failed to create session: status {}", res.status());
    }
    let body: Value = res.json().await.unwrap();
    body["session_id"].as_str().expect("No session_id").to_string()
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "GET" => client.get(&url).send().await,
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}

use chrono::NaiveDate;
use moonphase::app::serve_with_listener;
use moonphase::config::toml_config::TomlConfig;
use moonphase::{build_router, FixedClock, MeeusEphemeris, PhaseResult, PhaseService};
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn start_server(config: TomlConfig) -> SocketAddr {
    let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
    let service = PhaseService::new(MeeusEphemeris::new(), FixedClock::new(today), config.image_set());
    let router = build_router(service, &config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve_with_listener(listener, router).await.unwrap();
    });

    addr
}

#[tokio::test]
async fn test_end_to_end_phase_request() {
    let addr = start_server(TomlConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/phase_for_date", addr))
        .json(&serde_json::json!({ "date": "2024-01-20" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let result: PhaseResult = response.json().await.unwrap();
    assert_eq!(result.date, "2024-01-20");
    // Waxing gibbous, about 70% lit
    assert!((60.0..80.0).contains(&result.illumination_percentage));
    assert!((64..=86).contains(&result.image_number), "got {}", result.image_number);
    assert!(result.next_full_moon < result.next_new_moon);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let addr = start_server(TomlConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/phase_for_date", addr))
        .header("Origin", "http://localhost:3000")
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_cors_restricted_origin() {
    let mut config = TomlConfig::default();
    config.cors.allowed_origins = vec!["http://localhost:3000".to_string()];
    let addr = start_server(config).await;
    let client = reqwest::Client::new();

    let allowed = client
        .post(format!("http://{}/phase_for_date", addr))
        .header("Origin", "http://localhost:3000")
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );

    let denied = client
        .post(format!("http://{}/phase_for_date", addr))
        .header("Origin", "http://evil.example")
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_serves_phase_images_from_directory() {
    let image_dir = TempDir::new().unwrap();
    std::fs::write(image_dir.path().join("mp (42).png"), b"fake-png").unwrap();

    let mut config = TomlConfig::default();
    config.images.directory = Some(image_dir.path().to_str().unwrap().to_string());
    let addr = start_server(config).await;

    let response = reqwest::get(format!("http://{}/moon_images/mp%20(42).png", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(&response.bytes().await.unwrap()[..], b"fake-png");

    let missing = reqwest::get(format!("http://{}/moon_images/mp%20(999).png", addr))
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_images_not_served_without_directory() {
    let addr = start_server(TomlConfig::default()).await;

    let response = reqwest::get(format!("http://{}/moon_images/mp%20(42).png", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use moonphase::config::toml_config::TomlConfig;
use moonphase::{build_router, ErrorBody, FixedClock, ImageSet, MeeusEphemeris, PhaseResult, PhaseService};
use tower::ServiceExt;

fn router_with(config: &TomlConfig, today: &str) -> Router {
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d").unwrap();
    let service = PhaseService::new(MeeusEphemeris::new(), FixedClock::new(today), config.image_set());
    build_router(service, config).unwrap()
}

async fn post_phase(router: Router, body: &'static str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/phase_for_date")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_phase_for_explicit_date() {
    let router = router_with(&TomlConfig::default(), "2000-01-01");

    let (status, body) = post_phase(router, r#"{"date": "2024-01-25"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let result: PhaseResult = serde_json::from_value(body).unwrap();
    assert_eq!(result.date, "2024-01-25");
    assert!(result.illumination_percentage > 98.0);
    // Full moon day: either the top of the waxing run or the start of the waning run
    assert!(
        (105..=110).contains(&result.image_number),
        "got {}",
        result.image_number
    );
    assert_eq!(
        result.image_url,
        ImageSet::detailed().image_url(result.image_number)
    );
    assert!(result.next_new_moon.starts_with("2024-02-09"));
    assert!(result.next_full_moon.starts_with("2024-01-25 17:5"));
}

#[tokio::test]
async fn test_missing_date_defaults_to_clock() {
    let (status, body) = post_phase(router_with(&TomlConfig::default(), "2024-01-20"), "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2024-01-20");

    let (status, body) = post_phase(router_with(&TomlConfig::default(), "2024-01-20"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2024-01-20");
}

#[tokio::test]
async fn test_malformed_date_returns_error_payload() {
    let router = router_with(&TomlConfig::default(), "2024-01-20");

    let (status, body) = post_phase(router, r#"{"date": "not-a-date"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(error.error, ErrorBody::GENERIC);
    assert!(error.details.contains("not-a-date"));
}

#[tokio::test]
async fn test_malformed_json_returns_error_payload() {
    let router = router_with(&TomlConfig::default(), "2024-01-20");

    let (status, body) = post_phase(router, r#"{"date": "#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], ErrorBody::GENERIC);
}

#[tokio::test]
async fn test_flat_errors_keep_200() {
    let mut config = TomlConfig::default();
    config.server.flat_errors = true;

    let (status, body) = post_phase(router_with(&config, "2024-01-20"), r#"{"date": "2024/01/20"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], ErrorBody::GENERIC);
}

#[tokio::test]
async fn test_out_of_range_index_is_reported() {
    let mut config = TomlConfig::default();
    config.images.max_index = Some(150);

    // A waning crescent near new moon maps past index 200
    let (status, body) = post_phase(router_with(&config, "2024-01-01"), r#"{"date": "2024-01-09"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("outside the image set range 0..=150"));
}

#[tokio::test]
async fn test_compact_image_set() {
    let mut config = TomlConfig::default();
    config.images.preset = moonphase::config::toml_config::ImagePreset::Compact;

    let (status, body) = post_phase(router_with(&config, "2024-01-01"), r#"{"date": "2024-01-18"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let result: PhaseResult = serde_json::from_value(body).unwrap();
    assert!(result.image_number <= 100, "waxing index {}", result.image_number);
    assert!(result.image_url.ends_with(".jpg"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = router_with(&TomlConfig::default(), "2024-01-20");

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_get_is_not_allowed_on_phase_endpoint() {
    let router = router_with(&TomlConfig::default(), "2024-01-20");

    let response = router
        .oneshot(Request::builder().uri("/phase_for_date").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

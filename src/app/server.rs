//! HTTP surface: `POST /phase_for_date`, `GET /health` and, when configured,
//! the phase images themselves.

use crate::core::phase::PhaseService;
use crate::core::{Clock, ConfigProvider, Ephemeris, PhaseQuery};
use crate::domain::model::ErrorBody;
use crate::utils::error::{ErrorCategory, PhaseError, Result};
use crate::utils::validation::validate_socket_addr;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub struct AppState<E: Ephemeris, C: Clock> {
    service: PhaseService<E, C>,
    flat_errors: bool,
}

impl<E: Ephemeris, C: Clock> AppState<E, C> {
    pub fn new(service: PhaseService<E, C>, flat_errors: bool) -> Self {
        Self {
            service,
            flat_errors,
        }
    }

    fn phase_response(&self, body: &[u8]) -> Response {
        match parse_query(body).and_then(|query| self.service.phase_for(&query)) {
            Ok(result) => {
                tracing::info!(
                    date = %result.date,
                    image_number = result.image_number,
                    "🌙 Phase computed"
                );
                Json(result).into_response()
            }
            Err(e) => error_response(&e, self.flat_errors),
        }
    }
}

/// An empty (or whitespace-only) body means "today".
fn parse_query(body: &[u8]) -> Result<PhaseQuery> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PhaseQuery::today());
    }
    Ok(serde_json::from_slice(body)?)
}

pub fn status_code(err: &PhaseError) -> StatusCode {
    match err.category() {
        ErrorCategory::Client => StatusCode::BAD_REQUEST,
        ErrorCategory::Internal | ErrorCategory::Configuration => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_response(err: &PhaseError, flat_errors: bool) -> Response {
    let status = if flat_errors {
        StatusCode::OK
    } else {
        status_code(err)
    };

    match err.category() {
        ErrorCategory::Client => tracing::warn!("⚠️ Rejected phase request: {}", err),
        _ => tracing::error!(
            "❌ Phase request failed: {} (Category: {:?})",
            err,
            err.category()
        ),
    }

    (status, Json(ErrorBody::new(err.to_string()))).into_response()
}

async fn phase_for_date<E, C>(State(state): State<Arc<AppState<E, C>>>, body: Bytes) -> Response
where
    E: Ephemeris + 'static,
    C: Clock + 'static,
{
    state.phase_response(&body)
}

async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let values = origins
        .iter()
        .map(|origin| {
            let origin = origin.trim_end_matches('/');
            HeaderValue::from_str(origin).map_err(|e| PhaseError::InvalidConfigValueError {
                field: "cors.allowed_origins".to_string(),
                value: origin.to_string(),
                reason: format!("Not a valid header value: {}", e),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(values)))
}

pub fn build_router<E, C, P>(service: PhaseService<E, C>, config: &P) -> Result<Router>
where
    E: Ephemeris + 'static,
    C: Clock + 'static,
    P: ConfigProvider,
{
    let state = Arc::new(AppState::new(service, config.flat_errors()));

    let mut router = Router::new()
        .route("/phase_for_date", post(phase_for_date::<E, C>))
        .route("/health", get(health_handler))
        .with_state(state);

    if let Some(directory) = config.image_directory() {
        tracing::info!(
            path = %directory,
            mount = %config.image_mount_path(),
            "Serving phase images"
        );
        router = router.nest_service(config.image_mount_path(), ServeDir::new(directory));
    }

    Ok(router
        .layer(cors_layer(config.allowed_origins())?)
        .layer(TraceLayer::new_for_http()))
}

pub async fn serve(router: Router, bind: &str) -> Result<()> {
    let addr = validate_socket_addr("server.bind", bind)?;
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, router).await
}

pub async fn serve_with_listener(listener: TcpListener, router: Router) -> Result<()> {
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

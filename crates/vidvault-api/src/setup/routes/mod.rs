//! Route configuration and setup.
//!
//! The health check lives in [health](health); everything else is in `crate::handlers`.

pub(crate) mod health;

use crate::error::HttpAppError;
use crate::handlers;
use crate::middleware::{
    payload_limit::PayloadLimit,
    payload_too_large_middleware, request_id_middleware,
    security_headers::{security_headers_middleware, SecurityHeadersConfig},
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Uri},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use vidvault_core::{AppError, Config};

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let config = &state.config;
    let cors = setup_cors(config)?;

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));
    let payload_limit = PayloadLimit {
        max_mb: state.max_upload_size_mb(),
    };

    let http_concurrency_limit = config.http_concurrency_limit();
    let request_timeout_secs = config.request_timeout_secs();
    tracing::info!(
        http_concurrency_limit,
        request_timeout_secs,
        max_upload_size_bytes = config.max_upload_size_bytes(),
        "HTTP limits enabled"
    );

    let app = Router::new()
        .route("/", get(handlers::index::index))
        .route("/static/app.js", get(handlers::index::app_js))
        .route("/static/styles.css", get(handlers::index::styles_css))
        .route("/api/health", get(health::health_check))
        .route("/api/upload", post(handlers::video_upload::upload_videos))
        .route("/api/videos", get(handlers::video_list::list_videos))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(axum::middleware::from_fn_with_state(
            payload_limit,
            payload_too_large_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

async fn not_found(uri: Uri) -> HttpAppError {
    AppError::NotFound(format!("No route for {}", uri.path())).into()
}

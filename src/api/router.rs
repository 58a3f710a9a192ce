use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::handlers;
use super::middleware::{request_log, REQUEST_ID_HEADER};
use super::types::AppState;
use crate::config::Config;
use crate::logo::LOGO_URL_PREFIX;

pub fn build_router(state: AppState, config: &Config) -> Router {
    let logo_mount = LOGO_URL_PREFIX.trim_end_matches('/');

    Router::new()
        .route("/health", get(handlers::core::health))
        .route("/api/articles", get(handlers::articles::list_multiple))
        .route("/api/single-articles", get(handlers::articles::list_single))
        .route("/api/articles/update", post(handlers::update::update_one))
        .route("/api/articles/bulk-update", post(handlers::update::bulk_update))
        .route("/api/not-found-articles", get(handlers::not_found::list))
        .route("/api/search", get(handlers::search::search))
        .route("/api/stats", get(handlers::stats::stats))
        .route("/api/filter-counts", get(handlers::stats::filter_counts))
        .nest_service(logo_mount, ServeDir::new(&config.image_dir))
        .fallback(unknown_route)
        .layer(from_fn(request_log))
        .layer(build_cors_layer(config))
        .with_state(state)
}

async fn unknown_route() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(Duration::from_secs(86400));

    if config.cors_origins.is_empty() {
        tracing::debug!("CORS: allowing any origin");
        return cors.allow_origin(Any);
    }
    tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
    cors.allow_origin(config.cors_origins.clone())
}

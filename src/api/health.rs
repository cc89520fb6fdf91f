//! Health check and banner

use super::AppState;
use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub maps_connected: bool,
}

/// Banner at `/`
#[derive(Debug, Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub version: &'static str,
}

async fn health_check(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let maps_connected = match &state.maps {
        Some(maps) => maps.is_connected().await,
        None => false,
    };
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        maps_connected,
    })
}

async fn banner() -> Json<Banner> {
    Json(Banner {
        message: "Rumbo Travel Assistant API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
}

//! HTTP API
//!
//! - `POST /query`: run a travel query through the assistant
//! - `POST /create-payment-intent`: charge a payment method
//! - `GET /health`, `GET /`: liveness and banner

pub mod error;
pub mod health;
pub mod payments;
pub mod query;

use axum::{Extension, Router};
use rumbo_core::RequestHandler;
use rumbo_tools::commerce::CommerceProvider;
use rumbo_tools::mcp::SharedMcpServer;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use health::health_routes;
pub use payments::payments_routes;
pub use query::query_routes;

/// Defaults for `/create-payment-intent`
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub default_currency: String,
    pub return_url: Option<String>,
}

/// Everything the handlers share
pub struct AppState {
    pub handler: RequestHandler,
    pub commerce: Arc<dyn CommerceProvider>,
    pub maps: Option<SharedMcpServer>,
    pub payments: PaymentSettings,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(query_routes())
        .merge(payments_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

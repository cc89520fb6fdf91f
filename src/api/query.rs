//! `POST /query`

use super::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Extension, Json, Router};
use rumbo_core::{HistoryEntry, Query, Response};
use serde::Deserialize;
use std::sync::Arc;

/// Request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl From<QueryRequest> for Query {
    fn from(request: QueryRequest) -> Self {
        Self {
            text: request.query,
            history: request.history,
            conversation_id: request.conversation_id,
        }
    }
}

pub fn query_routes() -> Router {
    Router::new().route("/query", post(process_query))
}

async fn process_query(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Response>, ApiError> {
    let Json(request) = body?;
    let response = state.handler.handle(request.into()).await?;
    Ok(Json(response))
}

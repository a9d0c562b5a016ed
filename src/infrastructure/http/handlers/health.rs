//! Health Handler

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::infrastructure::http::dto::HealthResponse;
use crate::infrastructure::http::state::AppState;

/// GET /health - 不需要鉴权，也不限流
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.catalog.get_models().await;

    tracing::debug!(models = snapshot.len(), "Health check");

    Json(HealthResponse {
        status: "ok",
        models_in_cache: snapshot.len(),
        catalog_source: snapshot.source().as_str(),
        timestamp: Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

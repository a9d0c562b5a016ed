//! Model Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::ListModels;
use crate::infrastructure::http::dto::ModelListResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// GET /v1/models
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelListResponse>, ApiError> {
    let list = state.list_models_handler.handle(ListModels).await?;
    Ok(Json(ModelListResponse::from(list)))
}

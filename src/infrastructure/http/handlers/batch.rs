//! Batch Task Handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::{GetTask, GetTaskAudio, SubmitBatch, AUDIO_CONTENT_TYPE};
use crate::infrastructure::http::dto::{BatchRequest, BatchSubmittedResponse, TaskResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /v1/audio/speech/batch
pub async fn submit_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchSubmittedResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let command = SubmitBatch {
        model: req.model,
        texts: req.texts,
        speed: req.params.speed,
        pitch: req.params.pitch,
    };

    let response = state.submit_batch_handler.handle(command).await?;
    Ok((StatusCode::ACCEPTED, Json(response.into())))
}

/// GET /v1/tasks/:task_id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let view = state.get_task_handler.handle(GetTask { task_id }).await?;
    Ok(Json(view.into()))
}

/// GET /v1/tasks/:task_id/audio/:index
pub async fn get_task_audio(
    State(state): State<Arc<AppState>>,
    Path((task_id, index)): Path<(String, usize)>,
) -> Result<Response, ApiError> {
    let audio = state
        .get_task_audio_handler
        .handle(GetTaskAudio { task_id, index })
        .await?;

    Ok((
        [(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)],
        Body::from(audio.as_ref().clone()),
    )
        .into_response())
}

//! Speech Handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::CreateSpeech;
use crate::infrastructure::http::dto::SpeechRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /v1/audio/speech
///
/// 合成在独立任务中执行；超时后请求返回 504，但上游调用会继续跑完
pub async fn create_speech(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    if req.model.trim().is_empty() || req.input.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: 'model' and 'input'".to_string(),
        ));
    }

    let command = CreateSpeech {
        model: req.model,
        input: req.input,
        speed: req.speed,
        emotion: req.emotion,
    };

    let handler = state.create_speech_handler.clone();
    let job = tokio::spawn(async move { handler.handle(command).await });

    let result = match tokio::time::timeout(state.request_timeout, job).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_error)) => {
            return Err(ApiError::Internal(format!("Synthesis task failed: {}", join_error)));
        }
        Err(_) => {
            return Err(ApiError::GatewayTimeout(format!(
                "Speech synthesis did not finish within {} seconds",
                state.request_timeout.as_secs()
            )));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, result.content_type.to_string()),
            (header::CONTENT_LENGTH, result.audio.len().to_string()),
        ],
        Body::from(result.audio),
    )
        .into_response())
}

//! HTTP Routes
//!
//! API Endpoints:
//! - /v1/audio/speech                  POST  合成语音（返回 audio/mpeg）
//! - /v1/models                        GET   列出可用音色
//! - /v1/audio/speech/batch            POST  提交批量合成任务
//! - /v1/tasks/:task_id                GET   查询批量任务
//! - /v1/tasks/:task_id/audio/:index   GET   下载批量任务中的音频
//! - /health                           GET   健康检查（无需鉴权）

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::middleware::{enforce_rate_limit, require_api_key};
use super::rate_limit::ClientRateLimiter;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let limits = state.rate_limits.as_ref();

    let protected = Router::new()
        .merge(rate_limited(speech_routes(), limits.map(|l| &l.speech)))
        .merge(rate_limited(model_routes(), limits.map(|l| &l.models)))
        .merge(rate_limited(task_routes(), limits.map(|l| &l.default)))
        .route_layer(from_fn_with_state(state, require_api_key));

    Router::new()
        .merge(protected)
        .route("/health", get(handlers::health))
}

fn rate_limited(
    router: Router<Arc<AppState>>,
    limiter: Option<&ClientRateLimiter>,
) -> Router<Arc<AppState>> {
    match limiter {
        Some(limiter) => router.route_layer(from_fn_with_state(limiter.clone(), enforce_rate_limit)),
        None => router,
    }
}

/// Speech 路由
fn speech_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/audio/speech", post(handlers::create_speech))
}

/// Model 路由
fn model_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/models", get(handlers::list_models))
}

/// Batch 与 Task 路由
fn task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/audio/speech/batch", post(handlers::submit_batch))
        .route("/v1/tasks/:task_id", get(handlers::get_task))
        .route("/v1/tasks/:task_id/audio/:index", get(handlers::get_task_audio))
}

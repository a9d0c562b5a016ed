//! Application State
//!
//! 包含所有 Command/Query Handlers 以及鉴权、限流配置

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    // Command handlers
    BatchLimits, CreateSpeechHandler, SubmitBatchHandler,
    // Query handlers
    GetTaskAudioHandler, GetTaskHandler, ListModelsHandler,
    // Ports
    TaskManagerPort, UpstreamPort, VoiceCatalogPort,
};

use super::rate_limit::RateLimits;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub catalog: Arc<dyn VoiceCatalogPort>,
    pub task_manager: Arc<dyn TaskManagerPort>,

    // ========== Gateway ==========
    /// 合法的 API Key
    pub api_keys: HashSet<String>,
    /// None 表示不限流
    pub rate_limits: Option<RateLimits>,
    /// 单次合成请求的超时
    pub request_timeout: Duration,

    // ========== Command Handlers ==========
    pub create_speech_handler: Arc<CreateSpeechHandler>,
    pub submit_batch_handler: SubmitBatchHandler,

    // ========== Query Handlers ==========
    pub list_models_handler: ListModelsHandler,
    pub get_task_handler: GetTaskHandler,
    pub get_task_audio_handler: GetTaskAudioHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        catalog: Arc<dyn VoiceCatalogPort>,
        upstream: Arc<dyn UpstreamPort>,
        task_manager: Arc<dyn TaskManagerPort>,
        batch_limits: BatchLimits,
    ) -> Self {
        Self {
            // Ports
            catalog: catalog.clone(),
            task_manager: task_manager.clone(),

            // Gateway
            api_keys: HashSet::new(),
            rate_limits: None,
            request_timeout: Duration::from_secs(30),

            // Command handlers
            create_speech_handler: Arc::new(CreateSpeechHandler::new(catalog.clone(), upstream)),
            submit_batch_handler: SubmitBatchHandler::new(
                catalog.clone(),
                task_manager.clone(),
                batch_limits,
            ),

            // Query handlers
            list_models_handler: ListModelsHandler::new(catalog),
            get_task_handler: GetTaskHandler::new(task_manager.clone()),
            get_task_audio_handler: GetTaskAudioHandler::new(task_manager),
        }
    }

    pub fn with_api_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.api_keys = keys.into_iter().collect();
        self
    }

    pub fn with_rate_limits(mut self, rate_limits: RateLimits) -> Self {
        self.rate_limits = Some(rate_limits);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

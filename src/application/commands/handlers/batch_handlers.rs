//! Batch Command Handlers

use chrono::Duration;
use std::sync::Arc;

use crate::application::commands::{SubmitBatch, SubmitBatchResponse, ESTIMATED_SECS_PER_TEXT};
use crate::application::error::ApplicationError;
use crate::application::ports::{BatchTask, TaskManagerPort, VoiceCatalogPort};
use crate::domain::voice::Prosody;

/// 批量任务限制
#[derive(Debug, Clone)]
pub struct BatchLimits {
    /// 单个任务最多文本数
    pub max_texts: usize,
    /// 任务保留时间
    pub retention: Duration,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_texts: 10,
            retention: Duration::hours(1),
        }
    }
}

/// SubmitBatch Handler
pub struct SubmitBatchHandler {
    catalog: Arc<dyn VoiceCatalogPort>,
    task_manager: Arc<dyn TaskManagerPort>,
    limits: BatchLimits,
}

impl SubmitBatchHandler {
    pub fn new(
        catalog: Arc<dyn VoiceCatalogPort>,
        task_manager: Arc<dyn TaskManagerPort>,
        limits: BatchLimits,
    ) -> Self {
        Self {
            catalog,
            task_manager,
            limits,
        }
    }

    pub async fn handle(&self, command: SubmitBatch) -> Result<SubmitBatchResponse, ApplicationError> {
        if command.model.trim().is_empty() || command.texts.is_empty() {
            return Err(ApplicationError::validation(
                "Missing required fields: 'texts' and 'model'",
            ));
        }

        if command.texts.len() > self.limits.max_texts {
            return Err(ApplicationError::validation(format!(
                "Batch task supports maximum {} texts",
                self.limits.max_texts
            )));
        }

        if let Some(index) = command.texts.iter().position(|t| t.trim().is_empty()) {
            return Err(ApplicationError::validation(format!(
                "texts[{}] must not be empty",
                index
            )));
        }

        let prosody = Prosody::new(command.speed.unwrap_or(1.0), command.pitch.unwrap_or(1.0));
        prosody.validate().map_err(ApplicationError::validation)?;

        let catalog = self.catalog.get_models().await;
        if !catalog.contains(&command.model) {
            return Err(ApplicationError::UnknownVoice(command.model));
        }

        self.task_manager.purge_expired(self.limits.retention);

        let text_count = command.texts.len();
        let task = BatchTask::new(command.model, command.texts, prosody);
        let state = task.state;
        let task_id = self.task_manager.submit(task)?;

        tracing::info!(task_id = %task_id, texts = text_count, "Batch task created");

        Ok(SubmitBatchResponse {
            task_id,
            state,
            estimated_time_secs: text_count as u64 * ESTIMATED_SECS_PER_TEXT,
        })
    }
}

//! Task Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{BatchTask, ItemState, TaskError, TaskManagerPort, TaskState};
use crate::application::queries::{GetTask, GetTaskAudio};

/// 预览文本的最大字符数
const PREVIEW_CHARS: usize = 50;

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone)]
pub struct TaskItemView {
    pub index: usize,
    pub text_preview: String,
    pub state: ItemState,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskView {
    pub task_id: String,
    pub model: String,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub items: Vec<TaskItemView>,
}

impl From<BatchTask> for TaskView {
    fn from(task: BatchTask) -> Self {
        let items = task
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| TaskItemView {
                index,
                text_preview: preview(&item.text),
                state: item.state,
                error: item.error,
            })
            .collect();

        Self {
            task_id: task.task_id,
            model: task.voice_tag,
            state: task.state,
            created_at: task.created_at,
            completed_at: task.completed_at,
            items,
        }
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetTask Handler
pub struct GetTaskHandler {
    task_manager: Arc<dyn TaskManagerPort>,
}

impl GetTaskHandler {
    pub fn new(task_manager: Arc<dyn TaskManagerPort>) -> Self {
        Self { task_manager }
    }

    pub async fn handle(&self, query: GetTask) -> Result<TaskView, ApplicationError> {
        let task = self
            .task_manager
            .get_task(&query.task_id)
            .ok_or_else(|| ApplicationError::not_found("Task", query.task_id))?;

        Ok(TaskView::from(task))
    }
}

/// GetTaskAudio Handler
pub struct GetTaskAudioHandler {
    task_manager: Arc<dyn TaskManagerPort>,
}

impl GetTaskAudioHandler {
    pub fn new(task_manager: Arc<dyn TaskManagerPort>) -> Self {
        Self { task_manager }
    }

    pub async fn handle(&self, query: GetTaskAudio) -> Result<Arc<Vec<u8>>, ApplicationError> {
        let task = self
            .task_manager
            .get_task(&query.task_id)
            .ok_or_else(|| ApplicationError::not_found("Task", query.task_id.clone()))?;

        task.items
            .get(query.index)
            .and_then(|item| item.audio.clone())
            .ok_or_else(|| {
                TaskError::ItemNotFound {
                    task_id: query.task_id,
                    index: query.index,
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("short"), "short");

        let long = "字".repeat(60);
        let expected = format!("{}...", "字".repeat(50));
        assert_eq!(preview(&long), expected);
    }
}

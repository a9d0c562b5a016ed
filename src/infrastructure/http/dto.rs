//! Data Transfer Objects - OpenAI 兼容格式

use serde::{Deserialize, Serialize};

use crate::application::{ItemState, ModelList, SubmitBatchResponse, TaskView};

// ============================================================================
// Speech DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub input: String,
    pub speed: Option<f32>,
    pub emotion: Option<String>,
}

// ============================================================================
// Model DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModelObject {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub object: &'static str,
    pub data: Vec<ModelObject>,
}

impl From<ModelList> for ModelListResponse {
    fn from(list: ModelList) -> Self {
        let created = list.created;
        Self {
            object: "list",
            data: list
                .models
                .into_iter()
                .map(|model| ModelObject {
                    id: model.id,
                    object: "model",
                    created,
                    owned_by: "nanoai",
                    description: model.description,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Batch DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct BatchParams {
    pub speed: Option<f32>,
    pub pitch: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default)]
    pub params: BatchParams,
}

#[derive(Debug, Serialize)]
pub struct BatchSubmittedResponse {
    pub task_id: String,
    pub status: &'static str,
    /// 预估耗时（秒）
    pub estimated_time: u64,
}

impl From<SubmitBatchResponse> for BatchSubmittedResponse {
    fn from(response: SubmitBatchResponse) -> Self {
        Self {
            task_id: response.task_id,
            status: response.state.as_str(),
            estimated_time: response.estimated_time_secs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResultItem {
    pub index: usize,
    pub text: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub model: String,
    pub status: &'static str,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub results: Vec<TaskResultItem>,
}

impl From<TaskView> for TaskResponse {
    fn from(view: TaskView) -> Self {
        let results = view
            .items
            .into_iter()
            .map(|item| {
                let status = match item.state {
                    ItemState::Pending => "pending",
                    ItemState::Ready => "ready",
                    ItemState::Failed => "failed",
                };
                let audio_url = (item.state == ItemState::Ready)
                    .then(|| format!("/v1/tasks/{}/audio/{}", view.task_id, item.index));

                TaskResultItem {
                    index: item.index,
                    text: item.text_preview,
                    status,
                    audio_url,
                    error: item.error,
                }
            })
            .collect();

        Self {
            task_id: view.task_id,
            model: view.model,
            status: view.state.as_str(),
            created_at: view.created_at.to_rfc3339(),
            completed_at: view.completed_at.map(|t| t.to_rfc3339()),
            results,
        }
    }
}

// ============================================================================
// Health DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_in_cache: usize,
    pub catalog_source: &'static str,
    pub timestamp: i64,
    pub version: &'static str,
}

//! Batch Commands

use crate::application::ports::TaskState;

/// 提交批量合成任务
#[derive(Debug, Clone)]
pub struct SubmitBatch {
    pub model: String,
    pub texts: Vec<String>,
    pub speed: Option<f32>,
    pub pitch: Option<f32>,
}

/// 每条文本的预估耗时（秒）
pub const ESTIMATED_SECS_PER_TEXT: u64 = 5;

#[derive(Debug, Clone)]
pub struct SubmitBatchResponse {
    pub task_id: String,
    pub state: TaskState,
    pub estimated_time_secs: u64,
}

//! Task Manager Port - 批量合成任务管理
//!
//! 定义任务管理的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::voice::Prosody;

/// Task Manager 错误
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task already exists: {0}")]
    AlreadyExists(String),

    #[error("Task {task_id} has no item {index}")]
    ItemNotFound { task_id: String, index: usize },

    #[error("Task queue is full")]
    QueueFull,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// 等待处理
    Pending,
    /// 正在合成
    Processing,
    /// 完成（至少一条成功）
    Completed,
    /// 全部失败
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Processing => "processing",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// 单条文本的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    Ready,
    Failed,
}

/// 批量任务中的一条文本
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub text: String,
    pub state: ItemState,
    pub audio: Option<Arc<Vec<u8>>>,
    pub error: Option<String>,
}

impl BatchItem {
    fn new(text: String) -> Self {
        Self {
            text,
            state: ItemState::Pending,
            audio: None,
            error: None,
        }
    }
}

/// 批量合成任务
#[derive(Debug, Clone)]
pub struct BatchTask {
    pub task_id: String,
    pub voice_tag: String,
    pub prosody: Prosody,
    pub items: Vec<BatchItem>,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchTask {
    pub fn new(voice_tag: String, texts: Vec<String>, prosody: Prosody) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            voice_tag,
            prosody,
            items: texts.into_iter().map(BatchItem::new).collect(),
            state: TaskState::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn ready_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state == ItemState::Ready)
            .count()
    }
}

/// Task Manager Port
///
/// 所有任务状态存储在内存中
pub trait TaskManagerPort: Send + Sync {
    /// 保存任务并放入处理队列
    fn submit(&self, task: BatchTask) -> Result<String, TaskError>;

    /// 获取任务
    fn get_task(&self, task_id: &str) -> Option<BatchTask>;

    /// 设置任务状态
    fn set_state(&self, task_id: &str, state: TaskState) -> Result<(), TaskError>;

    /// 记录单条文本的合成结果
    fn record_item(
        &self,
        task_id: &str,
        index: usize,
        result: Result<Vec<u8>, String>,
    ) -> Result<(), TaskError>;

    /// 清理超过保留时间的任务，返回清理数量
    fn purge_expired(&self, max_age: Duration) -> usize;
}

//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{TaskError, UpstreamError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 文本为空
    #[error("Input text must not be empty")]
    EmptyInput,

    /// 音色不在当前目录中
    #[error("Model '{0}' not found. Please use the /v1/models endpoint to see available models.")]
    UnknownVoice(String),

    /// 上游网络或 HTTP 错误
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// 上游返回的数据不像音频
    #[error("Invalid audio response: {0}")]
    InvalidAudioResponse(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<UpstreamError> for ApplicationError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidAudioResponse { .. } => {
                Self::InvalidAudioResponse(err.to_string())
            }
            UpstreamError::Unavailable { .. }
            | UpstreamError::MalformedCatalog(_)
            | UpstreamError::Signing(_) => Self::UpstreamUnavailable(err.to_string()),
        }
    }
}

impl From<TaskError> for ApplicationError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(id) => Self::not_found("Task", id),
            TaskError::ItemNotFound { task_id, index } => {
                Self::not_found("Task item", format!("{}/{}", task_id, index))
            }
            TaskError::QueueFull => Self::InternalError(err.to_string()),
            TaskError::AlreadyExists(_) => Self::InternalError(err.to_string()),
        }
    }
}

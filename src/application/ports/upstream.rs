//! Upstream Port - 上游 TTS 服务抽象
//!
//! 定义上游调用的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 上游错误
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream unavailable: {reason}")]
    Unavailable {
        /// HTTP 状态码（传输层错误时为空）
        status: Option<u16>,
        reason: String,
    },

    #[error("Invalid audio response: {len} bytes")]
    InvalidAudioResponse { len: usize },

    #[error("Malformed catalog: {0}")]
    MalformedCatalog(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),
}

impl UpstreamError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            status: None,
            reason: reason.into(),
        }
    }

    pub fn http_status(status: u16, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            status: Some(status),
            reason: reason.into(),
        }
    }
}

impl From<crate::domain::voice::CatalogError> for UpstreamError {
    fn from(err: crate::domain::voice::CatalogError) -> Self {
        Self::MalformedCatalog(err.to_string())
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本（已截断）
    pub text: String,
    /// 上游音色 tag
    pub voice_tag: String,
    pub speed: f32,
    pub pitch: f32,
}

/// Upstream Port
///
/// 上游只有两个接口：音色目录与语音合成
#[async_trait]
pub trait UpstreamPort: Send + Sync {
    /// 拉取音色目录，返回原始 JSON
    async fn fetch_voice_catalog(&self) -> Result<Vec<u8>, UpstreamError>;

    /// 合成语音，返回原始 MP3 数据
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, UpstreamError>;
}

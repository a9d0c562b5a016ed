//! Voice Catalog Port - 音色目录缓存
//!
//! 具体实现在 infrastructure/memory 层

use async_trait::async_trait;
use std::sync::Arc;

use super::UpstreamError;
use crate::domain::voice::CatalogSnapshot;

/// Voice Catalog Port
#[async_trait]
pub trait VoiceCatalogPort: Send + Sync {
    /// 获取当前目录
    ///
    /// 目录为空或过期时同步刷新一次；刷新失败不会返回错误，
    /// 而是返回旧快照（冷启动时为默认音色）
    async fn get_models(&self) -> Arc<CatalogSnapshot>;

    /// 强制刷新，失败时返回错误且保留旧快照
    async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, UpstreamError>;
}

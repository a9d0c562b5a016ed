//! Catalog Mirror Port - 音色目录磁盘镜像
//!
//! 尽力而为：读写失败只记录日志，不影响正确性

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 镜像中保存的上游响应
#[derive(Debug, Clone)]
pub struct MirroredCatalog {
    /// 上游原始 JSON
    pub payload: Vec<u8>,
    /// 写入时间
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait CatalogMirrorPort: Send + Sync {
    /// 读取镜像，不存在或不可读时返回 None
    async fn load(&self) -> Option<MirroredCatalog>;

    /// 保存上游响应
    async fn store(&self, payload: &[u8]);
}

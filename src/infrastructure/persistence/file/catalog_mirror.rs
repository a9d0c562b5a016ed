//! File Catalog Mirror - 音色目录的磁盘镜像
//!
//! 实现 CatalogMirrorPort trait，文件为 `{cache_dir}/robots.json`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;

use crate::application::ports::{CatalogMirrorPort, MirroredCatalog};

pub const MIRROR_FILE_NAME: &str = "robots.json";

/// 文件系统镜像
///
/// 目录无法创建时整个镜像被禁用，读写都变成空操作
pub struct FileCatalogMirror {
    /// None 表示已禁用
    path: Option<PathBuf>,
    /// 写失败只告警一次
    write_warned: AtomicBool,
}

impl FileCatalogMirror {
    /// 创建镜像，必要时创建目录
    pub async fn new(cache_dir: impl AsRef<Path>) -> Self {
        let cache_dir = cache_dir.as_ref();

        if cache_dir.as_os_str().is_empty() {
            tracing::info!("Catalog mirror disabled by configuration");
            return Self::disabled();
        }

        match fs::create_dir_all(cache_dir).await {
            Ok(()) => {
                let path = cache_dir.join(MIRROR_FILE_NAME);
                tracing::info!(path = %path.display(), "Catalog mirror enabled");
                Self {
                    path: Some(path),
                    write_warned: AtomicBool::new(false),
                }
            }
            Err(e) => {
                tracing::warn!(
                    dir = %cache_dir.display(),
                    error = %e,
                    "Cannot create cache directory, catalog mirror disabled"
                );
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            write_warned: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn write_atomic(path: &Path, payload: &[u8]) -> std::io::Result<()> {
        // 尽量保存为易读的格式
        let pretty = serde_json::from_slice::<serde_json::Value>(payload)
            .and_then(|value| serde_json::to_vec_pretty(&value))
            .unwrap_or_else(|_| payload.to_vec());

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, pretty).await?;
        fs::rename(&tmp_path, path).await
    }
}

#[async_trait]
impl CatalogMirrorPort for FileCatalogMirror {
    async fn load(&self) -> Option<MirroredCatalog> {
        let path = self.path.as_ref()?;

        let metadata = fs::metadata(path).await.ok()?;
        let payload = match fs::read(path).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read catalog mirror");
                return None;
            }
        };

        let saved_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        tracing::debug!(path = %path.display(), size = payload.len(), "Catalog mirror read");
        Some(MirroredCatalog { payload, saved_at })
    }

    async fn store(&self, payload: &[u8]) {
        let Some(path) = &self.path else {
            return;
        };

        match Self::write_atomic(path, payload).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Catalog mirror updated");
            }
            Err(e) => {
                if !self.write_warned.swap(true, Ordering::SeqCst) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to write catalog mirror");
                }
            }
        }
    }
}

//! TTL Voice Catalog - 带过期时间的音色目录缓存
//!
//! 快照以 `Arc` 整体替换，读路径只持有很短的读锁；
//! 刷新由异步互斥锁串行化，多个并发读者只会触发一次上游请求

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use crate::application::ports::{
    CatalogMirrorPort, UpstreamError, UpstreamPort, VoiceCatalogPort,
};
use crate::domain::voice::{CatalogSnapshot, CatalogSource};

/// 默认过期时间：2 小时
pub const DEFAULT_CATALOG_TTL_SECS: i64 = 7200;

pub struct TtlVoiceCatalog {
    upstream: Arc<dyn UpstreamPort>,
    mirror: Option<Arc<dyn CatalogMirrorPort>>,
    ttl: Duration,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl TtlVoiceCatalog {
    pub fn new(upstream: Arc<dyn UpstreamPort>, ttl: Duration) -> Self {
        Self {
            upstream,
            mirror: None,
            ttl,
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::empty())),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn CatalogMirrorPort>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 当前快照，不触发刷新
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, snapshot: CatalogSnapshot) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(snapshot);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot.clone(),
            Err(poisoned) => *poisoned.into_inner() = snapshot.clone(),
        }
        snapshot
    }

    /// 从磁盘镜像预热缓存
    ///
    /// 快照时间取镜像文件的修改时间，过期的镜像会在第一次读取时刷新。
    /// 返回是否成功加载
    pub async fn bootstrap(&self) -> bool {
        let Some(mirror) = &self.mirror else {
            return false;
        };
        let Some(mirrored) = mirror.load().await else {
            return false;
        };

        match CatalogSnapshot::parse_payload(&mirrored.payload) {
            Ok(entries) => {
                let snapshot = self.publish(CatalogSnapshot::new(
                    entries,
                    mirrored.saved_at,
                    CatalogSource::Mirror,
                ));
                tracing::info!(
                    voices = snapshot.len(),
                    saved_at = %mirrored.saved_at,
                    "Voice catalog loaded from mirror"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable catalog mirror");
                false
            }
        }
    }

    /// 调用方必须持有 refresh_lock
    async fn refresh_locked(&self, now: DateTime<Utc>) -> Result<Arc<CatalogSnapshot>, UpstreamError> {
        let payload = self.upstream.fetch_voice_catalog().await?;
        let entries = CatalogSnapshot::parse_payload(&payload)?;

        let snapshot = self.publish(CatalogSnapshot::new(entries, now, CatalogSource::Upstream));
        tracing::info!(voices = snapshot.len(), "Voice catalog refreshed from upstream");

        if let Some(mirror) = &self.mirror {
            mirror.store(&payload).await;
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl VoiceCatalogPort for TtlVoiceCatalog {
    async fn get_models(&self) -> Arc<CatalogSnapshot> {
        let current = self.current();
        if !current.is_stale(Utc::now(), self.ttl) {
            return current;
        }

        let _guard = self.refresh_lock.lock().await;

        // 等锁期间可能已被其他读者刷新
        let current = self.current();
        let now = Utc::now();
        if !current.is_stale(now, self.ttl) {
            return current;
        }

        match self.refresh_locked(now).await {
            Ok(snapshot) => snapshot,
            Err(e) if current.is_empty() => {
                tracing::warn!(error = %e, "Voice catalog unavailable, using default voice");
                self.publish(CatalogSnapshot::fallback(now))
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source = current.source().as_str(),
                    "Voice catalog refresh failed, keeping previous snapshot"
                );
                current
            }
        }
    }

    async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, UpstreamError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked(Utc::now()).await
    }
}

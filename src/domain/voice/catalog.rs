//! Voice Catalog - 音色目录快照
//!
//! 快照一经构建即不可变，刷新时整体替换

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use super::{CatalogError, VoiceEntry};

/// 上游不可用且没有任何快照时使用的默认音色
pub const DEFAULT_VOICE_TAG: &str = "DeepSeek";
pub const DEFAULT_VOICE_LABEL: &str = "DeepSeek (默认)";

/// 快照来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Empty,
    Upstream,
    Mirror,
    Fallback,
}

impl CatalogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Upstream => "upstream",
            Self::Mirror => "mirror",
            Self::Fallback => "fallback",
        }
    }
}

/// 音色目录快照
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    entries: HashMap<String, VoiceEntry>,
    refreshed_at: Option<DateTime<Utc>>,
    source: CatalogSource,
}

impl CatalogSnapshot {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            refreshed_at: None,
            source: CatalogSource::Empty,
        }
    }

    pub fn new(
        entries: impl IntoIterator<Item = VoiceEntry>,
        refreshed_at: DateTime<Utc>,
        source: CatalogSource,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.tag.clone(), entry))
                .collect(),
            refreshed_at: Some(refreshed_at),
            source,
        }
    }

    /// 仅包含默认音色的快照
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self::new(
            [VoiceEntry::new(DEFAULT_VOICE_TAG, DEFAULT_VOICE_LABEL)],
            now,
            CatalogSource::Fallback,
        )
    }

    /// 解析上游 `/api/robot/platform` 的响应
    ///
    /// 期望结构: `{"data": {"list": [{"tag", "title", "icon"}, ...]}}`
    pub fn parse_payload(payload: &[u8]) -> Result<Vec<VoiceEntry>, CatalogError> {
        let parsed: CatalogPayload = serde_json::from_slice(payload)
            .map_err(|e| CatalogError::Malformed(e.to_string()))?;

        // 空目录会立即过期，宁可走默认音色兜底
        if parsed.data.list.is_empty() {
            return Err(CatalogError::Malformed("voice list is empty".to_string()));
        }

        Ok(parsed
            .data
            .list
            .into_iter()
            .map(|item| VoiceEntry {
                tag: item.tag,
                display_name: item.title,
                icon_url: item.icon.filter(|icon| !icon.is_empty()),
            })
            .collect())
    }

    pub fn get(&self, tag: &str) -> Option<&VoiceEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &VoiceEntry> {
        self.entries.values()
    }

    /// tag -> 显示名称，按 tag 排序
    pub fn models(&self) -> BTreeMap<String, String> {
        self.entries
            .values()
            .map(|entry| (entry.tag.clone(), entry.display_name.clone()))
            .collect()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    /// 空快照或超过 ttl 的快照需要刷新
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.refreshed_at {
            Some(refreshed_at) if !self.entries.is_empty() => now - refreshed_at > ttl,
            _ => true,
        }
    }
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogPayload {
    data: CatalogData,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    list: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    tag: String,
    title: String,
    #[serde(default)]
    icon: Option<String>,
}

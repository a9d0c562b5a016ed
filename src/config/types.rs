//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 鉴权配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 限流配置
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// 上游服务配置
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// 音色目录缓存配置
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// 批量任务配置
    #[serde(default)]
    pub batch: BatchConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 单次合成请求的超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 鉴权配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 合法的 API Key 列表
    #[serde(default = "default_api_keys")]
    pub api_keys: Vec<String>,
}

pub const DEFAULT_API_KEY: &str = "sk-nanoai-default-key";

fn default_api_keys() -> Vec<String> {
    vec![DEFAULT_API_KEY.to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_keys: default_api_keys(),
        }
    }
}

impl AuthConfig {
    /// 去掉空白和空项
    pub fn normalized_keys(&self) -> Vec<String> {
        self.api_keys
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 限流配置（每分钟请求数，按客户端 IP）
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    #[serde(default = "default_per_minute")]
    pub default_per_minute: u32,

    #[serde(default = "default_speech_per_minute")]
    pub speech_per_minute: u32,

    #[serde(default = "default_models_per_minute")]
    pub models_per_minute: u32,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_per_minute() -> u32 {
    10
}

fn default_speech_per_minute() -> u32 {
    30
}

fn default_models_per_minute() -> u32 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            default_per_minute: default_per_minute(),
            speech_per_minute: default_speech_per_minute(),
            models_per_minute: default_models_per_minute(),
        }
    }
}

/// 上游服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// 上游基础 URL
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_upstream_url() -> String {
    "https://bot.n.cn".to_string()
}

fn default_upstream_timeout() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

/// 音色目录缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// 缓存有效期（秒）
    #[serde(default = "default_catalog_ttl")]
    pub ttl_secs: u64,

    /// 磁盘镜像目录，空字符串表示禁用
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_catalog_ttl() -> u64 {
    7200 // 2 小时
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_catalog_ttl(),
            cache_dir: default_cache_dir(),
        }
    }
}

/// 批量任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// 单个任务最多文本数
    #[serde(default = "default_max_texts")]
    pub max_texts: usize,

    /// 同时处理的任务数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 任务保留时间（秒）
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    /// 等待队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_texts() -> usize {
    10
}

fn default_max_concurrent() -> usize {
    2
}

fn default_retention() -> u64 {
    3600 // 1 小时
}

fn default_queue_capacity() -> usize {
    100
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_texts: default_max_texts(),
            max_concurrent: default_max_concurrent(),
            retention_secs: default_retention(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.upstream.base_url, "https://bot.n.cn");
        assert_eq!(config.catalog.ttl_secs, 7200);
        assert_eq!(config.auth.api_keys, vec![DEFAULT_API_KEY.to_string()]);
        assert_eq!(config.rate_limit.speech_per_minute, 30);
        assert_eq!(config.batch.max_texts, 10);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5001");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_normalized_keys() {
        let auth = AuthConfig {
            api_keys: vec![" sk-a ".to_string(), String::new(), "sk-b".to_string()],
        };
        assert_eq!(auth.normalized_keys(), vec!["sk-a", "sk-b"]);
    }
}

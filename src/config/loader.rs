//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 旧部署使用的环境变量（TTS_API_KEY、PORT、CACHE_DURATION、CACHE_DIR）
//! 2. 环境变量（前缀 `NANOTTS_`）
//! 3. 配置文件（config.toml）
//! 4. 默认值

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `NANOTTS_SERVER__PORT=8080`
/// - `NANOTTS_AUTH__API_KEYS=sk-a,sk-b`
/// - `NANOTTS_UPSTREAM__BASE_URL=https://bot.n.cn`
/// - `NANOTTS_CATALOG__CACHE_DIR=`（禁用磁盘镜像）
/// - `TTS_API_KEY=sk-a,sk-b`、`PORT=5001`、`CACHE_DURATION=7200`、`CACHE_DIR=cache`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = with_defaults(Config::builder())?;

    // 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量
    // 前缀: NANOTTS_
    // 层级分隔符: __ (双下划线)
    // auth.api_keys 以逗号分隔
    builder = builder.add_source(
        Environment::with_prefix("NANOTTS")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("auth.api_keys")
            .try_parsing(true),
    );

    // 旧部署的环境变量
    builder = apply_legacy_env(builder, |name| std::env::var(name).ok())?;

    build(builder)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5001)?
        .set_default("server.request_timeout_secs", 30)?
        .set_default("auth.api_keys", vec![super::types::DEFAULT_API_KEY])?
        .set_default("rate_limit.enabled", true)?
        .set_default("rate_limit.default_per_minute", 10)?
        .set_default("rate_limit.speech_per_minute", 30)?
        .set_default("rate_limit.models_per_minute", 60)?
        .set_default("upstream.base_url", "https://bot.n.cn")?
        .set_default("upstream.timeout_secs", 30)?
        .set_default("catalog.ttl_secs", 7200)?
        .set_default("catalog.cache_dir", "cache")?
        .set_default("batch.max_texts", 10)?
        .set_default("batch.max_concurrent", 2)?
        .set_default("batch.retention_secs", 3600)?
        .set_default("batch.queue_capacity", 100)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?)
}

/// 旧部署的环境变量作为最高优先级覆盖
fn apply_legacy_env<F>(
    builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let keys = lookup("TTS_API_KEY").map(|value| {
        value
            .split(',')
            .map(|key| key.trim().to_string())
            .collect::<Vec<_>>()
    });

    let port = lookup("PORT")
        .map(|value| {
            value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::ParseError(format!("PORT is not a valid port: {}", value)))
        })
        .transpose()?;

    let ttl = lookup("CACHE_DURATION")
        .map(|value| {
            value.trim().parse::<u64>().map_err(|_| {
                ConfigError::ParseError(format!("CACHE_DURATION is not a number: {}", value))
            })
        })
        .transpose()?;

    Ok(builder
        .set_override_option("auth.api_keys", keys)?
        .set_override_option("server.port", port.map(i64::from))?
        .set_override_option("catalog.ttl_secs", ttl)?
        .set_override_option("catalog.cache_dir", lookup("CACHE_DIR"))?)
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Request timeout cannot be 0".to_string(),
        ));
    }

    if config.auth.normalized_keys().is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one API key is required".to_string(),
        ));
    }

    if config.upstream.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Upstream base URL cannot be empty".to_string(),
        ));
    }

    if config.rate_limit.enabled
        && (config.rate_limit.default_per_minute == 0
            || config.rate_limit.speech_per_minute == 0
            || config.rate_limit.models_per_minute == 0)
    {
        return Err(ConfigError::ValidationError(
            "Rate limits must be positive when rate limiting is enabled".to_string(),
        ));
    }

    if config.batch.max_texts == 0 || config.batch.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Batch max_texts and max_concurrent must be positive".to_string(),
        ));
    }

    if config.batch.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Batch queue capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Request Timeout: {}s", config.server.request_timeout_secs);
    tracing::info!("API Keys: {} configured", config.auth.normalized_keys().len());
    tracing::info!("Rate Limit Enabled: {}", config.rate_limit.enabled);
    if config.rate_limit.enabled {
        tracing::info!(
            "Rate Limits (per minute): speech={}, models={}, default={}",
            config.rate_limit.speech_per_minute,
            config.rate_limit.models_per_minute,
            config.rate_limit.default_per_minute
        );
    }
    tracing::info!("Upstream: {}", config.upstream.base_url);
    tracing::info!("Upstream Timeout: {}s", config.upstream.timeout_secs);
    tracing::info!("Catalog TTL: {}s", config.catalog.ttl_secs);
    tracing::info!("Catalog Mirror: {:?}", config.catalog.cache_dir);
    tracing::info!(
        "Batch: max_texts={}, max_concurrent={}, retention={}s",
        config.batch.max_texts,
        config.batch.max_concurrent,
        config.batch.retention_secs
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    fn load_with_legacy(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let builder = with_defaults(Config::builder())?;
        let builder = apply_legacy_env(builder, |name| vars.get(name).cloned())?;
        build(builder)
    }

    #[test]
    fn test_defaults_validate() {
        let config = load_with_legacy(&[]).unwrap();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.auth.api_keys, vec!["sk-nanoai-default-key"]);
        assert_eq!(config.catalog.cache_dir, PathBuf::from("cache"));
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_legacy_env_overrides() {
        let config = load_with_legacy(&[
            ("TTS_API_KEY", "sk-a, sk-b"),
            ("PORT", "8080"),
            ("CACHE_DURATION", "60"),
            ("CACHE_DIR", ""),
        ])
        .unwrap();

        assert_eq!(config.auth.normalized_keys(), vec!["sk-a", "sk-b"]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.catalog.ttl_secs, 60);
        assert_eq!(config.catalog.cache_dir, PathBuf::from(""));
    }

    #[test]
    fn test_legacy_port_must_parse() {
        let err = load_with_legacy(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_config_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[catalog]\nttl_secs = 120\n\n[auth]\napi_keys = [\"sk-file\"]"
        )
        .unwrap();

        let builder = with_defaults(Config::builder())
            .unwrap()
            .add_source(File::from(file.path()).required(true));
        let config = build(builder).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.catalog.ttl_secs, 120);
        assert_eq!(config.auth.api_keys, vec!["sk-file"]);
        assert_eq!(config.upstream.timeout_secs, 30);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_blank_keys() {
        let mut config = AppConfig::default();
        config.auth.api_keys = vec![" ".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_upstream() {
        let mut config = AppConfig::default();
        config.upstream.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_rate_limit() {
        let mut config = AppConfig::default();
        config.rate_limit.speech_per_minute = 0;
        assert!(validate_config(&config).is_err());

        config.rate_limit.enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}

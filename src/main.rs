//! NanoTTS - OpenAI 兼容语音合成网关
//!
//! - Domain: voice/ (音色目录)
//! - Application: commands, queries, ports
//! - Infrastructure: http, adapters, memory, persistence, worker

use std::sync::Arc;
use std::time::Duration;

use nanotts::application::{BatchLimits, UpstreamPort, VoiceCatalogPort};
use nanotts::config::{load_config, print_config, AppConfig};
use nanotts::infrastructure::adapters::{NanoAiClient, NanoAiClientConfig};
use nanotts::infrastructure::http::{AppState, HttpServer, RateLimits, ServerConfig};
use nanotts::infrastructure::memory::{InMemoryTaskManager, TtlVoiceCatalog};
use nanotts::infrastructure::persistence::FileCatalogMirror;
use nanotts::infrastructure::worker::{BatchWorker, BatchWorkerConfig};
use tokio::sync::mpsc;

/// 限流器清理空闲客户端的周期
const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},nanotts={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：旧环境变量 > NANOTTS_* > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("NanoTTS - OpenAI 兼容语音合成网关");
    print_config(&config);

    // 创建上游客户端
    let upstream_config = NanoAiClientConfig::new(&config.upstream.base_url)
        .with_timeout(config.upstream.timeout_secs);
    let upstream: Arc<dyn UpstreamPort> = Arc::new(NanoAiClient::new(upstream_config)?);

    // 创建音色目录缓存（带磁盘镜像）
    let mirror = Arc::new(FileCatalogMirror::new(&config.catalog.cache_dir).await);
    let ttl = chrono::Duration::seconds(i64::try_from(config.catalog.ttl_secs)?);
    let catalog = Arc::new(TtlVoiceCatalog::new(upstream.clone(), ttl).with_mirror(mirror));
    catalog.bootstrap().await;

    // 预热目录
    tracing::info!("Warming up voice catalog...");
    let snapshot = catalog.get_models().await;
    tracing::info!(
        voices = snapshot.len(),
        source = snapshot.source().as_str(),
        "Voice catalog ready"
    );
    let catalog: Arc<dyn VoiceCatalogPort> = catalog;

    // 创建任务队列与批量任务管理器
    let (task_tx, task_rx) = mpsc::channel(config.batch.queue_capacity);
    let task_manager = Arc::new(InMemoryTaskManager::new(task_tx));

    let batch_limits = BatchLimits {
        max_texts: config.batch.max_texts,
        retention: chrono::Duration::seconds(i64::try_from(config.batch.retention_secs)?),
    };

    let mut state = AppState::new(catalog, upstream, task_manager.clone(), batch_limits)
        .with_api_keys(config.auth.normalized_keys())
        .with_request_timeout(config.server.request_timeout());
    if config.rate_limit.enabled {
        let limits = RateLimits::new(
            config.rate_limit.speech_per_minute,
            config.rate_limit.models_per_minute,
            config.rate_limit.default_per_minute,
        );
        limits.spawn_sweeper(RATE_LIMIT_SWEEP_INTERVAL);
        state = state.with_rate_limits(limits);
    }

    // 启动 BatchWorker
    let worker = BatchWorker::new(
        BatchWorkerConfig {
            max_concurrent: config.batch.max_concurrent,
        },
        task_rx,
        task_manager,
        state.create_speech_handler.clone(),
    );
    tokio::spawn(worker.run());

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

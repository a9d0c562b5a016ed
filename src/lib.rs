//! NanoTTS - bot.n.cn 的 OpenAI 兼容语音合成网关
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色目录快照、语速/音调、情绪映射
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Upstream, VoiceCatalog, CatalogMirror, TaskManager）
//! - Commands: 语音合成门面、批量任务提交
//! - Queries: 音色列表、批量任务查询
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: OpenAI 兼容 API、鉴权、限流
//! - Adapters: bot.n.cn 客户端与请求签名
//! - Memory: 带 TTL 的音色目录缓存、批量任务管理
//! - Persistence: 音色目录磁盘镜像
//! - Worker: BatchWorker 后台任务处理

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

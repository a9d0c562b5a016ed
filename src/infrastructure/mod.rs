//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod http;
pub mod memory;
pub mod persistence;
pub mod worker;

pub use adapters::{FakeUpstreamClient, NanoAiClient, NanoAiClientConfig};
pub use memory::{InMemoryTaskManager, TtlVoiceCatalog};
pub use persistence::FileCatalogMirror;
pub use worker::{BatchWorker, BatchWorkerConfig};

//! Memory Layer - In-Memory State Management
//!
//! 实现 VoiceCatalog 和 TaskManager，管理音色目录快照和批量任务的内存状态

mod task_manager;
mod voice_catalog;

pub use task_manager::InMemoryTaskManager;
pub use voice_catalog::{TtlVoiceCatalog, DEFAULT_CATALOG_TTL_SECS};

//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod catalog_mirror;
mod task_manager;
mod upstream;
mod voice_catalog;

pub use catalog_mirror::{CatalogMirrorPort, MirroredCatalog};
pub use task_manager::{BatchItem, BatchTask, ItemState, TaskError, TaskManagerPort, TaskState};
pub use upstream::{SynthesisRequest, UpstreamError, UpstreamPort};
pub use voice_catalog::VoiceCatalogPort;

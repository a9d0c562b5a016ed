//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod model_queries;
mod task_queries;

pub mod handlers;

pub use model_queries::*;
pub use task_queries::*;

//! 应用层 - 命令（写操作）
//!
//! 语音合成与批量任务提交

mod batch_commands;
mod speech_commands;

pub mod handlers;

pub use batch_commands::*;
pub use speech_commands::*;

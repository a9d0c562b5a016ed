//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 上游音色目录快照
//! - 情绪到语速 / 音调的映射

mod catalog;
mod errors;
mod value_objects;

pub use catalog::{CatalogSnapshot, CatalogSource, DEFAULT_VOICE_LABEL, DEFAULT_VOICE_TAG};
pub use errors::CatalogError;
pub use value_objects::{Emotion, Prosody, VoiceEntry};

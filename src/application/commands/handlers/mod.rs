//! Command Handlers

mod batch_handlers;
mod speech_handlers;

pub use batch_handlers::{BatchLimits, SubmitBatchHandler};
pub use speech_handlers::{CreateSpeechHandler, AUDIO_CONTENT_TYPE, MAX_INPUT_CHARS};

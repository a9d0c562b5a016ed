//! Query Handlers

mod model_handlers;
mod task_handlers;

pub use model_handlers::{ListModelsHandler, ModelInfo, ModelList};
pub use task_handlers::{GetTaskAudioHandler, GetTaskHandler, TaskItemView, TaskView};

//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Upstream、VoiceCatalog、CatalogMirror、TaskManager）
//! - commands: 语音合成门面与批量任务提交
//! - queries: 音色列表与批量任务查询
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    CreateSpeech,
    SpeechAudio,
    SubmitBatch,
    SubmitBatchResponse,
    // Handlers
    handlers::{
        BatchLimits, CreateSpeechHandler, SubmitBatchHandler, AUDIO_CONTENT_TYPE, MAX_INPUT_CHARS,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Catalog mirror
    CatalogMirrorPort,
    MirroredCatalog,
    // Task manager
    BatchItem,
    BatchTask,
    ItemState,
    TaskError,
    TaskManagerPort,
    TaskState,
    // Upstream
    SynthesisRequest,
    UpstreamError,
    UpstreamPort,
    // Voice catalog
    VoiceCatalogPort,
};

pub use queries::{
    GetTask,
    GetTaskAudio,
    ListModels,
    // Handlers
    handlers::{
        GetTaskAudioHandler, GetTaskHandler, ListModelsHandler, ModelInfo, ModelList,
        TaskItemView, TaskView,
    },
};

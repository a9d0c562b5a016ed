//! Speech Commands

/// OpenAI 兼容的语音合成命令
#[derive(Debug, Clone)]
pub struct CreateSpeech {
    /// 音色 tag
    pub model: String,
    /// 要合成的文本
    pub input: String,
    /// 语速，缺省 1.0
    pub speed: Option<f32>,
    /// 情绪标签，缺省 neutral
    pub emotion: Option<String>,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub audio: Vec<u8>,
    pub content_type: &'static str,
}

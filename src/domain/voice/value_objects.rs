//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

/// 上游提供的一个合成音色
///
/// `tag` 即对外暴露的 model id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceEntry {
    pub tag: String,
    pub display_name: String,
    pub icon_url: Option<String>,
}

impl VoiceEntry {
    pub fn new(tag: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            display_name: display_name.into(),
            icon_url: None,
        }
    }

    pub fn with_icon(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }
}

/// 语速 / 音调参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    /// 语速 (0.25 - 4.0)
    pub speed: f32,
    /// 音调
    pub pitch: f32,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 1.0,
        }
    }
}

impl Prosody {
    pub fn new(speed: f32, pitch: f32) -> Self {
        Self { speed, pitch }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.speed.is_finite() || !(0.25..=4.0).contains(&self.speed) {
            return Err("语速必须在 0.25 到 4.0 之间");
        }
        if !self.pitch.is_finite() || self.pitch <= 0.0 {
            return Err("音调必须为正数");
        }
        Ok(())
    }
}

/// 情绪标签
///
/// 在调用合成之前映射为语速 / 音调，未识别的标签按 neutral 处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    #[default]
    Neutral,
}

impl Emotion {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "happy" => Self::Happy,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Neutral => "neutral",
        }
    }

    /// 映射为合成参数，只有 neutral 使用调用方给出的语速
    pub fn prosody(&self, requested_speed: f32) -> Prosody {
        match self {
            Self::Happy => Prosody::new(1.1, 1.2),
            Self::Sad => Prosody::new(0.9, 0.8),
            Self::Angry => Prosody::new(1.2, 1.1),
            Self::Neutral => Prosody::new(requested_speed, 1.0),
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Speech Command Handlers
//!
//! 合成门面：校验文本与音色，截断文本，然后交给上游合成

use std::sync::Arc;

use crate::application::commands::{CreateSpeech, SpeechAudio};
use crate::application::error::ApplicationError;
use crate::application::ports::{SynthesisRequest, UpstreamPort, VoiceCatalogPort};
use crate::domain::voice::{Emotion, Prosody};

/// 单次合成允许的最大字符数，超出部分截断
pub const MAX_INPUT_CHARS: usize = 1000;

/// 上游始终返回 MP3
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// CreateSpeech Handler
pub struct CreateSpeechHandler {
    catalog: Arc<dyn VoiceCatalogPort>,
    upstream: Arc<dyn UpstreamPort>,
}

impl CreateSpeechHandler {
    pub fn new(catalog: Arc<dyn VoiceCatalogPort>, upstream: Arc<dyn UpstreamPort>) -> Self {
        Self { catalog, upstream }
    }

    pub async fn handle(&self, command: CreateSpeech) -> Result<SpeechAudio, ApplicationError> {
        if command.model.trim().is_empty() {
            return Err(ApplicationError::validation(
                "Missing required fields: 'model' and 'input'",
            ));
        }

        let emotion = command
            .emotion
            .as_deref()
            .map(Emotion::from_label)
            .unwrap_or_default();
        let prosody = emotion.prosody(command.speed.unwrap_or(1.0));
        prosody.validate().map_err(ApplicationError::validation)?;

        tracing::info!(
            model = %command.model,
            emotion = %emotion,
            speed = prosody.speed,
            pitch = prosody.pitch,
            text_len = command.input.chars().count(),
            "Speech request received"
        );

        let audio = self
            .get_audio(&command.input, &command.model, prosody)
            .await?;

        Ok(SpeechAudio {
            audio,
            content_type: AUDIO_CONTENT_TYPE,
        })
    }

    /// 合成音频
    ///
    /// 文本为空返回 `EmptyInput`，音色不在目录中返回 `UnknownVoice`，
    /// 超过 [`MAX_INPUT_CHARS`] 的文本会被截断
    pub async fn get_audio(
        &self,
        text: &str,
        voice_tag: &str,
        prosody: Prosody,
    ) -> Result<Vec<u8>, ApplicationError> {
        if text.trim().is_empty() {
            return Err(ApplicationError::EmptyInput);
        }

        let catalog = self.catalog.get_models().await;
        if !catalog.contains(voice_tag) {
            tracing::warn!(voice = %voice_tag, "Requested voice is not in the catalog");
            return Err(ApplicationError::UnknownVoice(voice_tag.to_string()));
        }

        let text = match truncate_chars(text, MAX_INPUT_CHARS) {
            Some(truncated) => {
                tracing::warn!(
                    voice = %voice_tag,
                    max_chars = MAX_INPUT_CHARS,
                    "Input text too long, truncating"
                );
                truncated
            }
            None => text,
        };

        let request = SynthesisRequest {
            text: text.to_string(),
            voice_tag: voice_tag.to_string(),
            speed: prosody.speed,
            pitch: prosody.pitch,
        };

        let audio = self.upstream.synthesize(request).await.map_err(|e| {
            tracing::error!(voice = %voice_tag, error = %e, "Upstream synthesis failed");
            ApplicationError::from(e)
        })?;

        tracing::info!(
            voice = %voice_tag,
            audio_size = audio.len(),
            "Speech synthesized"
        );

        Ok(audio)
    }
}

/// 按字符截断，未超长时返回 None
fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    text.char_indices()
        .nth(max_chars)
        .map(|(byte_index, _)| &text[..byte_index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::application::ports::UpstreamError;
    use crate::domain::voice::{CatalogSnapshot, CatalogSource, VoiceEntry};

    struct StaticCatalog(Arc<CatalogSnapshot>);

    impl StaticCatalog {
        fn with_tags(tags: &[&str]) -> Self {
            let entries = tags.iter().map(|tag| VoiceEntry::new(*tag, *tag));
            Self(Arc::new(CatalogSnapshot::new(
                entries,
                Utc::now(),
                CatalogSource::Upstream,
            )))
        }
    }

    #[async_trait]
    impl VoiceCatalogPort for StaticCatalog {
        async fn get_models(&self) -> Arc<CatalogSnapshot> {
            self.0.clone()
        }

        async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, UpstreamError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingUpstream {
        requests: Mutex<Vec<SynthesisRequest>>,
    }

    #[async_trait]
    impl UpstreamPort for RecordingUpstream {
        async fn fetch_voice_catalog(&self) -> Result<Vec<u8>, UpstreamError> {
            Err(UpstreamError::unavailable("not used"))
        }

        async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, UpstreamError> {
            self.requests.lock().unwrap().push(request);
            Ok(vec![0xFF; 256])
        }
    }

    fn handler(upstream: Arc<RecordingUpstream>) -> CreateSpeechHandler {
        CreateSpeechHandler::new(
            Arc::new(StaticCatalog::with_tags(&["DeepSeek"])),
            upstream,
        )
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let upstream = Arc::new(RecordingUpstream::default());
        let handler = handler(upstream.clone());

        let result = handler.get_audio("", "DeepSeek", Prosody::default()).await;
        assert!(matches!(result, Err(ApplicationError::EmptyInput)));

        let result = handler.get_audio("   \n", "DeepSeek", Prosody::default()).await;
        assert!(matches!(result, Err(ApplicationError::EmptyInput)));

        assert!(upstream.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_voice_rejected() {
        let upstream = Arc::new(RecordingUpstream::default());
        let handler = handler(upstream.clone());

        let result = handler
            .get_audio("hello", "NoSuchVoice", Prosody::default())
            .await;
        assert!(matches!(result, Err(ApplicationError::UnknownVoice(tag)) if tag == "NoSuchVoice"));
        assert!(upstream.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_long_text_truncated_to_limit() {
        let upstream = Arc::new(RecordingUpstream::default());
        let handler = handler(upstream.clone());

        let text = "语".repeat(MAX_INPUT_CHARS + 500);
        let audio = handler
            .get_audio(&text, "DeepSeek", Prosody::default())
            .await
            .unwrap();
        assert_eq!(audio.len(), 256);

        let requests = upstream.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text.chars().count(), MAX_INPUT_CHARS);
    }

    #[tokio::test]
    async fn test_handle_applies_emotion() {
        let upstream = Arc::new(RecordingUpstream::default());
        let handler = handler(upstream.clone());

        let result = handler
            .handle(CreateSpeech {
                model: "DeepSeek".to_string(),
                input: "你好".to_string(),
                speed: Some(1.5),
                emotion: Some("sad".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(result.content_type, AUDIO_CONTENT_TYPE);

        let requests = upstream.requests.lock().unwrap();
        assert_eq!(requests[0].speed, 0.9);
        assert_eq!(requests[0].pitch, 0.8);
    }

    #[tokio::test]
    async fn test_handle_rejects_missing_model() {
        let handler = handler(Arc::new(RecordingUpstream::default()));
        let result = handler
            .handle(CreateSpeech {
                model: String::new(),
                input: "hello".to_string(),
                speed: None,
                emotion: None,
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), None);
        assert_eq!(truncate_chars("abc", 3), None);
        assert_eq!(truncate_chars("abcdef", 3), Some("abc"));
        assert_eq!(truncate_chars("你好世界", 2), Some("你好"));
    }
}

//! NanoAI Client - 调用 bot.n.cn
//!
//! 实现 UpstreamPort trait，每个请求都重新签名
//!
//! 上游 API:
//! GET  {base}/api/robot/platform
//! Response: {"data": {"list": [{"tag": "...", "title": "...", "icon": "..."}]}}
//!
//! POST {base}/api/tts/v1?roleid={tag}&speed={speed}&pitch={pitch}
//! Request: &text={percent-encoded}&audio_type=mp3&format=stream  (form)
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use super::signer::{float_repr, SigningContext, ORIGIN};
use crate::application::ports::{SynthesisRequest, UpstreamError, UpstreamPort};

/// 小于该长度的响应视为无效音频
pub const MIN_AUDIO_BYTES: usize = 100;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// NanoAI 客户端配置
#[derive(Debug, Clone)]
pub struct NanoAiClientConfig {
    /// 上游基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for NanoAiClientConfig {
    fn default() -> Self {
        Self {
            base_url: ORIGIN.to_string(),
            timeout_secs: 30,
        }
    }
}

impl NanoAiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// NanoAI 客户端
pub struct NanoAiClient {
    client: Client,
    config: NanoAiClientConfig,
}

impl NanoAiClient {
    pub fn new(config: NanoAiClientConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn catalog_url(&self) -> String {
        format!("{}/api/robot/platform", self.base())
    }

    fn synthesis_url(&self, request: &SynthesisRequest) -> String {
        format!(
            "{}/api/tts/v1?roleid={}&speed={}&pitch={}",
            self.base(),
            urlencoding::encode(&request.voice_tag),
            float_repr(request.speed),
            float_repr(request.pitch)
        )
    }

    /// 附加新生成的签名头并发送
    async fn send_signed(&self, builder: RequestBuilder) -> Result<Response, UpstreamError> {
        let headers = SigningContext::generate()
            .headers()
            .map_err(|e| UpstreamError::Signing(e.to_string()))?;

        let response = builder.headers(headers).send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::unavailable("Request timed out")
            } else if e.is_connect() {
                UpstreamError::unavailable(format!("Cannot connect to upstream: {}", e))
            } else {
                UpstreamError::unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::http_status(
                status.as_u16(),
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        Ok(response)
    }
}

/// 表单体以 '&' 开头，文本做百分号编码
pub fn synthesis_form_body(text: &str) -> String {
    format!(
        "&text={}&audio_type=mp3&format=stream",
        urlencoding::encode(text)
    )
}

#[async_trait]
impl UpstreamPort for NanoAiClient {
    async fn fetch_voice_catalog(&self) -> Result<Vec<u8>, UpstreamError> {
        tracing::debug!(url = %self.catalog_url(), "Fetching voice catalog");

        let response = self.send_signed(self.client.get(self.catalog_url())).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::unavailable(format!("Failed to read catalog: {}", e)))?;

        Ok(body.to_vec())
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, UpstreamError> {
        let url = self.synthesis_url(&request);

        tracing::info!(
            voice = %request.voice_tag,
            text_chars = request.text.chars().count(),
            speed = request.speed,
            pitch = request.pitch,
            "Sending synthesis request"
        );

        let builder = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(synthesis_form_body(&request.text));

        let audio_data = self
            .send_signed(builder)
            .await?
            .bytes()
            .await
            .map_err(|e| UpstreamError::unavailable(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.len() < MIN_AUDIO_BYTES {
            return Err(UpstreamError::InvalidAudioResponse {
                len: audio_data.len(),
            });
        }

        tracing::info!(audio_size = audio_data.len(), "Synthesis completed");
        Ok(audio_data)
    }
}

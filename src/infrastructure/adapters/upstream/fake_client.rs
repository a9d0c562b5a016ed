//! Fake Upstream Client - 用于测试的上游客户端
//!
//! 返回固定的音色目录与音频，不访问网络

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{SynthesisRequest, UpstreamError, UpstreamPort};

/// 默认目录：两个音色
pub const FAKE_CATALOG_JSON: &str = r#"{"data":{"list":[
    {"tag":"DeepSeek","title":"DeepSeek","icon":"https://example.com/deepseek.png"},
    {"tag":"Kimi","title":"Kimi","icon":""}
]}}"#;

/// Fake Upstream Client
///
/// 可以切换为失败模式，并记录调用次数与最后一次合成请求
pub struct FakeUpstreamClient {
    catalog: Vec<u8>,
    audio: Vec<u8>,
    failing: AtomicBool,
    catalog_calls: AtomicUsize,
    synth_calls: AtomicUsize,
    last_request: Mutex<Option<SynthesisRequest>>,
}

impl FakeUpstreamClient {
    pub fn new(catalog: impl Into<Vec<u8>>, audio: Vec<u8>) -> Self {
        Self {
            catalog: catalog.into(),
            audio,
            failing: AtomicBool::new(false),
            catalog_calls: AtomicUsize::new(0),
            synth_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// 默认目录 + 1KB 静音数据
    pub fn with_defaults() -> Self {
        Self::new(FAKE_CATALOG_JSON, vec![0xFF; 1024])
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    pub fn synth_calls(&self) -> usize {
        self.synth_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SynthesisRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn check_failing(&self) -> Result<(), UpstreamError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(UpstreamError::unavailable("fake upstream is down"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UpstreamPort for FakeUpstreamClient {
    async fn fetch_voice_catalog(&self) -> Result<Vec<u8>, UpstreamError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.catalog.clone())
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<Vec<u8>, UpstreamError> {
        self.synth_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = request.text.len(),
            voice = %request.voice_tag,
            "FakeUpstreamClient: returning fixed audio"
        );

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }
        self.check_failing()?;
        Ok(self.audio.clone())
    }
}

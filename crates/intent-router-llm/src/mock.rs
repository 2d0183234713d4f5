use async_trait::async_trait;
use futures::stream;
use parking_lot::RwLock;
use std::sync::Arc;

use intent_router_core::{
    ChatMessage, FinishReason, LLMChunk, LLMConfig, LLMError, LLMFeature, LLMProvider,
    LLMResponse, LLMStream, TokenUsage,
};

type Responder = Arc<dyn Fn(&[ChatMessage]) -> String + Send + Sync>;

/// Scripted provider used as the stub collaborator in tests
#[derive(Clone)]
pub struct MockLLMProvider {
    inner: Arc<RwLock<MockLLMProviderInner>>,
}

struct MockLLMProviderInner {
    name: String,
    responses: Vec<String>,
    response_index: usize,
    cycle_responses: bool,
    responder: Option<Responder>,
    call_history: Vec<MockCall>,
    error: Option<LLMError>,
    latency_ms: u64,
    stream_error: Option<(usize, LLMError)>,
    features: Vec<LLMFeature>,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub messages: Vec<ChatMessage>,
    pub config: Option<LLMConfig>,
    pub timestamp: std::time::Instant,
}

impl MockCall {
    /// Content of the last message in the call, usually the rendered prompt
    pub fn prompt(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }
}

impl MockLLMProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockLLMProviderInner {
                name: name.into(),
                responses: Vec::new(),
                response_index: 0,
                cycle_responses: false,
                responder: None,
                call_history: Vec::new(),
                error: None,
                latency_ms: 0,
                stream_error: None,
                features: vec![LLMFeature::Streaming],
            })),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.set_response(response);
        self
    }

    pub fn set_response(&mut self, response: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.responses = vec![response.into()];
        inner.response_index = 0;
    }

    /// Responses are handed out in order; the last one repeats unless `cycle`.
    pub fn set_responses(&mut self, responses: Vec<String>, cycle: bool) {
        let mut inner = self.inner.write();
        inner.responses = responses;
        inner.response_index = 0;
        inner.cycle_responses = cycle;
    }

    /// Compute each response from the incoming messages. Takes precedence
    /// over scripted responses.
    pub fn set_responder<F>(&mut self, responder: F)
    where
        F: Fn(&[ChatMessage]) -> String + Send + Sync + 'static,
    {
        self.inner.write().responder = Some(Arc::new(responder));
    }

    pub fn set_error(&mut self, error_message: impl Into<String>) {
        self.fail_with(LLMError::Other(error_message.into()));
    }

    pub fn fail_with(&mut self, error: LLMError) {
        self.inner.write().error = Some(error);
    }

    pub fn clear_error(&mut self) {
        let mut inner = self.inner.write();
        inner.error = None;
        inner.stream_error = None;
    }

    /// Streams open normally, yield `after` chunks, then `error`.
    pub fn fail_stream_after(&mut self, after: usize, error: LLMError) {
        self.inner.write().stream_error = Some((after, error));
    }

    pub fn set_latency(&mut self, latency_ms: u64) {
        self.inner.write().latency_ms = latency_ms;
    }

    pub fn set_feature_support(&mut self, feature: LLMFeature, supported: bool) {
        let mut inner = self.inner.write();
        if supported {
            if !inner.features.contains(&feature) {
                inner.features.push(feature);
            }
        } else {
            inner.features.retain(|f| f != &feature);
        }
    }

    pub fn call_count(&self) -> usize {
        self.inner.read().call_history.len()
    }

    pub fn call_history(&self) -> Vec<MockCall> {
        self.inner.read().call_history.clone()
    }

    pub fn last_call(&self) -> Option<MockCall> {
        self.inner.read().call_history.last().cloned()
    }

    pub fn reset(&mut self) {
        let mut inner = self.inner.write();
        inner.responses.clear();
        inner.response_index = 0;
        inner.cycle_responses = false;
        inner.responder = None;
        inner.call_history.clear();
        inner.error = None;
        inner.stream_error = None;
        inner.latency_ms = 0;
        inner.features = vec![LLMFeature::Streaming];
    }

    fn next_content(&self, messages: &[ChatMessage]) -> String {
        let responder = self.inner.read().responder.clone();
        if let Some(responder) = responder {
            return responder(messages);
        }

        let mut inner = self.inner.write();
        if inner.responses.is_empty() {
            return "Mock response".to_string();
        }

        let content = inner.responses[inner.response_index].clone();
        if inner.cycle_responses {
            inner.response_index = (inner.response_index + 1) % inner.responses.len();
        } else if inner.response_index < inner.responses.len() - 1 {
            inner.response_index += 1;
        }
        content
    }

    fn record_call(&self, messages: &[ChatMessage], config: Option<&LLMConfig>) {
        self.inner.write().call_history.push(MockCall {
            messages: messages.to_vec(),
            config: config.cloned(),
            timestamp: std::time::Instant::now(),
        });
    }

    async fn simulate_latency(&self) {
        let latency_ms = self.inner.read().latency_ms;
        if latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(latency_ms)).await;
        }
    }

    fn injected_error(&self) -> Option<LLMError> {
        self.inner.read().error.clone()
    }

    fn estimate_tokens(messages: &[ChatMessage]) -> u32 {
        let total_chars: usize = messages.iter().map(|m| m.content.len()).sum();
        (total_chars / 4) as u32
    }
}

impl Default for MockLLMProvider {
    fn default() -> Self {
        Self::new("default")
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, LLMError> {
        self.record_call(messages, config);
        self.simulate_latency().await;

        if let Some(error) = self.injected_error() {
            return Err(error);
        }

        let content = self.next_content(messages);
        let usage = TokenUsage::new(
            Self::estimate_tokens(messages),
            (content.len() / 4) as u32,
        );
        let model = format!("mock-{}", self.inner.read().name);

        Ok(LLMResponse::new(content, FinishReason::Stop)
            .with_usage(usage)
            .with_model(model))
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        config: Option<&LLMConfig>,
    ) -> Result<LLMStream, LLMError> {
        self.record_call(messages, config);
        self.simulate_latency().await;

        if let Some(error) = self.injected_error() {
            return Err(error);
        }

        let content = self.next_content(messages);
        let words: Vec<&str> = content.split_whitespace().collect();
        let usage = TokenUsage::new(
            Self::estimate_tokens(messages),
            (content.len() / 4) as u32,
        );

        let mut chunks = Vec::with_capacity(words.len().max(1));
        for (i, word) in words.iter().enumerate() {
            let delta = if i == 0 {
                word.to_string()
            } else {
                format!(" {}", word)
            };

            let chunk = if i == words.len() - 1 {
                LLMChunk::final_chunk(delta, FinishReason::Stop, Some(usage))
            } else {
                LLMChunk::new(delta, false)
            };
            chunks.push(Ok(chunk));
        }

        if chunks.is_empty() {
            chunks.push(Ok(LLMChunk::final_chunk("", FinishReason::Stop, Some(usage))));
        }

        let stream_error = self.inner.read().stream_error.clone();
        if let Some((after, error)) = stream_error {
            chunks.truncate(after);
            chunks.push(Err(error));
        }

        Ok(Box::new(stream::iter(chunks)))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn supports(&self, feature: LLMFeature) -> bool {
        self.inner.read().features.contains(&feature)
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use intent_router_core::{
    ChatMessage, FinishReason, Intent, LLMChunk, LLMConfig, LLMFeature, LLMProvider, Result,
    RouterError,
};

use crate::config::RouterConfig;
use crate::template::PromptTemplate;

pub type ChunkStream = BoxStream<'static, Result<LLMChunk>>;

fn single_chunk(text: String) -> ChunkStream {
    let chunk = LLMChunk::final_chunk(text, FinishReason::Stop, None);
    stream::once(async move { Ok(chunk) }).boxed()
}

/// Turns raw input into output text for one route.
///
/// Handlers must not keep per-request state; the same instance serves
/// concurrent requests.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, raw_input: &str) -> Result<String>;

    /// Defaults to a single final chunk carrying the full `handle` output.
    async fn handle_stream(&self, raw_input: &str) -> Result<ChunkStream> {
        Ok(single_chunk(self.handle(raw_input).await?))
    }
}

/// Renders a role template around the input and returns the collaborator's
/// text verbatim.
pub struct PromptHandler {
    name: String,
    template: PromptTemplate,
    llm: Arc<dyn LLMProvider>,
    llm_config: LLMConfig,
}

impl PromptHandler {
    pub fn new(
        name: impl Into<String>,
        template: PromptTemplate,
        llm: Arc<dyn LLMProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            template,
            llm,
            llm_config: LLMConfig::default(),
        }
    }

    pub fn for_intent(
        intent: Intent,
        llm: Arc<dyn LLMProvider>,
        config: &RouterConfig,
    ) -> Result<Self> {
        let template = PromptTemplate::new(config.handler_template(intent))?;
        Ok(Self::new(intent.label(), template, llm).with_llm_config(config.handler_llm_config(intent)))
    }

    pub fn with_llm_config(mut self, llm_config: LLMConfig) -> Self {
        self.llm_config = llm_config;
        self
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    fn messages(&self, raw_input: &str) -> Result<Vec<ChatMessage>> {
        Ok(vec![ChatMessage::user(self.template.render(raw_input)?)])
    }
}

#[async_trait]
impl Handler for PromptHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, raw_input: &str) -> Result<String> {
        let messages = self.messages(raw_input)?;
        let response = self
            .llm
            .complete(&messages, Some(&self.llm_config))
            .await
            .map_err(|e| RouterError::handler(&self.name, e))?;
        Ok(response.content)
    }

    async fn handle_stream(&self, raw_input: &str) -> Result<ChunkStream> {
        if !self.llm.supports(LLMFeature::Streaming) {
            return Ok(single_chunk(self.handle(raw_input).await?));
        }

        let messages = self.messages(raw_input)?;
        let stream = self
            .llm
            .complete_stream(&messages, Some(&self.llm_config))
            .await
            .map_err(|e| RouterError::handler(&self.name, e))?;

        let name = self.name.clone();
        Ok(stream
            .map(move |chunk| chunk.map_err(|e| RouterError::handler(name.as_str(), e)))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_router_core::LLMError;
    use intent_router_llm::MockLLMProvider;

    struct Upper;

    #[async_trait]
    impl Handler for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn handle(&self, raw_input: &str) -> Result<String> {
            Ok(raw_input.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_prompt_handler_returns_output_verbatim() {
        let mock = MockLLMProvider::new("handler").with_response("  Sunny, 15°C  ");
        let handler =
            PromptHandler::for_intent(Intent::Weather, Arc::new(mock.clone()), &RouterConfig::default())
                .unwrap();

        assert_eq!(handler.name(), "weather");
        let output = handler.handle("weather in Beijing").await.unwrap();
        assert_eq!(output, "  Sunny, 15°C  ");

        let call = mock.last_call().unwrap();
        assert_eq!(
            call.prompt(),
            "You are a weather assistant, answer: weather in Beijing"
        );
        assert_eq!(call.config.unwrap().temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_prompt_handler_wraps_provider_error() {
        let mut mock = MockLLMProvider::new("handler");
        mock.fail_with(LLMError::Network("connection refused".into()));
        let handler =
            PromptHandler::for_intent(Intent::News, Arc::new(mock), &RouterConfig::default()).unwrap();

        let err = handler.handle("tech news today").await.unwrap_err();
        match err {
            RouterError::Handler { handler, source } => {
                assert_eq!(handler, "news");
                assert!(matches!(source, LLMError::Network(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_handler_streams_chunks() {
        let mock = MockLLMProvider::new("handler").with_response("Meeting booked for 3pm");
        let handler =
            PromptHandler::for_intent(Intent::Task, Arc::new(mock), &RouterConfig::default()).unwrap();

        let chunks: Vec<_> = handler
            .handle_stream("schedule a meeting")
            .await
            .unwrap()
            .collect()
            .await;
        let text: String = chunks
            .into_iter()
            .map(|c| c.unwrap().delta)
            .collect();
        assert_eq!(text, "Meeting booked for 3pm");
    }

    #[tokio::test]
    async fn test_stream_falls_back_without_streaming_support() {
        let mut mock = MockLLMProvider::new("handler").with_response("Mean is 2");
        mock.set_feature_support(LLMFeature::Streaming, false);
        let handler =
            PromptHandler::for_intent(Intent::Data, Arc::new(mock.clone()), &RouterConfig::default())
                .unwrap();

        let chunks: Vec<_> = handler
            .handle_stream("analyze this data: 1, 2, 3")
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        let chunk = chunks.into_iter().next().unwrap().unwrap();
        assert_eq!(chunk.delta, "Mean is 2");
        assert!(chunk.is_final);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mid_stream_error_names_handler() {
        let mut mock = MockLLMProvider::new("handler").with_response("Top story today");
        mock.fail_stream_after(2, LLMError::Network("connection reset".into()));
        let handler =
            PromptHandler::for_intent(Intent::News, Arc::new(mock), &RouterConfig::default()).unwrap();

        let chunks: Vec<_> = handler.handle_stream("tech news").await.unwrap().collect().await;
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].is_ok() && chunks[1].is_ok());
        assert!(matches!(
            &chunks[2],
            Err(RouterError::Handler { handler, source: LLMError::Network(_) }) if handler == "news"
        ));
    }

    #[tokio::test]
    async fn test_default_stream_is_single_final_chunk() {
        let chunks: Vec<_> = Upper.handle_stream("hi").await.unwrap().collect().await;
        assert_eq!(chunks.len(), 1);
        let chunk = chunks.into_iter().next().unwrap().unwrap();
        assert_eq!(chunk.delta, "HI");
        assert!(chunk.is_final);
    }
}

use std::sync::Arc;

use tracing::debug;

use intent_router_core::{ChatMessage, Intent, LLMConfig, LLMProvider, Result, RouterError};

use crate::config::{ClassifierConfig, default_classifier_template};
use crate::template::PromptTemplate;

/// Labels free-form input with one [`Intent`] using the generation collaborator.
pub struct Classifier {
    llm: Arc<dyn LLMProvider>,
    template: PromptTemplate,
    llm_config: LLMConfig,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LLMProvider>) -> Result<Self> {
        Self::from_config(llm, &ClassifierConfig::default())
    }

    pub fn from_config(llm: Arc<dyn LLMProvider>, config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            llm,
            template: PromptTemplate::new(config.template_source())?,
            llm_config: config.llm_config(),
        })
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn uses_default_template(&self) -> bool {
        self.template.source() == default_classifier_template()
    }

    /// One collaborator call, no retry. Unrecognized output maps to
    /// [`Intent::General`].
    pub async fn classify(&self, raw_input: &str) -> Result<Intent> {
        let prompt = self.template.render(raw_input)?;

        let response = self
            .llm
            .complete(&[ChatMessage::user(prompt)], Some(&self.llm_config))
            .await
            .map_err(RouterError::Classification)?;

        let intent = Self::parse_label(&response.content);
        debug!(
            provider = self.llm.provider_name(),
            label = %response.content.trim(),
            intent = %intent,
            "Classified input"
        );
        Ok(intent)
    }

    /// Case-insensitive substring match in priority order
    /// `weather, news, data, task`; anything else is `general`.
    pub fn parse_label(text: &str) -> Intent {
        let text = text.to_lowercase();
        Intent::SPECIFIC
            .into_iter()
            .find(|intent| text.contains(intent.label()))
            .unwrap_or(Intent::General)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_router_core::LLMError;
    use intent_router_llm::MockLLMProvider;

    #[test]
    fn test_parse_exact_labels() {
        assert_eq!(Classifier::parse_label("weather"), Intent::Weather);
        assert_eq!(Classifier::parse_label("news"), Intent::News);
        assert_eq!(Classifier::parse_label("data"), Intent::Data);
        assert_eq!(Classifier::parse_label("task"), Intent::Task);
        assert_eq!(Classifier::parse_label("general"), Intent::General);
    }

    #[test]
    fn test_parse_is_case_insensitive_substring() {
        assert_eq!(Classifier::parse_label("  \"Weather\"\n"), Intent::Weather);
        assert_eq!(Classifier::parse_label("Category: NEWS"), Intent::News);
        assert_eq!(Classifier::parse_label("The intent is data."), Intent::Data);
    }

    #[test]
    fn test_parse_priority_order() {
        assert_eq!(Classifier::parse_label("task or weather"), Intent::Weather);
        assert_eq!(Classifier::parse_label("data news"), Intent::News);
        assert_eq!(Classifier::parse_label("task, data"), Intent::Data);
    }

    #[test]
    fn test_parse_unrecognized_falls_back_to_general() {
        assert_eq!(Classifier::parse_label("unknown"), Intent::General);
        assert_eq!(Classifier::parse_label(""), Intent::General);
        assert_eq!(Classifier::parse_label("天气"), Intent::General);
    }

    #[tokio::test]
    async fn test_classify_sends_rendered_prompt_with_low_temperature() {
        let mock = MockLLMProvider::new("classifier").with_response("weather");
        let classifier = Classifier::new(Arc::new(mock.clone())).unwrap();

        let intent = classifier.classify("weather in Beijing").await.unwrap();
        assert_eq!(intent, Intent::Weather);
        assert!(classifier.uses_default_template());

        let call = mock.last_call().unwrap();
        assert!(call.prompt().contains("User input: weather in Beijing"));
        assert!(call.prompt().contains("\"general\": general conversation"));
        let config = call.config.unwrap();
        assert_eq!(config.temperature, Some(0.3));
        assert_eq!(config.max_tokens, Some(16));
    }

    #[tokio::test]
    async fn test_classify_custom_template() {
        let mock = MockLLMProvider::new("classifier").with_response("task");
        let classifier = Classifier::new(Arc::new(mock.clone()))
            .unwrap()
            .with_template(PromptTemplate::new("label this: {{ input }}").unwrap());

        assert_eq!(classifier.classify("schedule a meeting").await.unwrap(), Intent::Task);
        assert_eq!(mock.last_call().unwrap().prompt(), "label this: schedule a meeting");
    }

    #[tokio::test]
    async fn test_classify_propagates_provider_error() {
        let mut mock = MockLLMProvider::new("classifier");
        mock.fail_with(LLMError::Auth("invalid api key".into()));
        let classifier = Classifier::new(Arc::new(mock)).unwrap();

        let err = classifier.classify("hello").await.unwrap_err();
        assert!(matches!(err, RouterError::Classification(LLMError::Auth(_))));
    }
}

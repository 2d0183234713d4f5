//! Router configuration

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use intent_router_core::{Intent, LLMConfig, Result, RouterError};

use crate::template::PromptTemplate;

/// Classifier prompt listing every intent label with its description.
pub fn default_classifier_template() -> String {
    let labels: Vec<String> = Intent::ALL
        .iter()
        .map(|intent| format!("- \"{}\": {}", intent.label(), intent.description()))
        .collect();

    format!(
        "Analyze the intent of the user input and classify it as exactly one of:\n\
         {}\n\n\
         User input: {{{{ input }}}}\n\n\
         Return only the category label, nothing else.",
        labels.join("\n")
    )
}

pub fn default_handler_template(intent: Intent) -> &'static str {
    match intent {
        Intent::Weather => "You are a weather assistant, answer: {{ input }}",
        Intent::News => "You are a news assistant, answer: {{ input }}",
        Intent::Data => "You are a data analysis assistant, answer: {{ input }}",
        Intent::Task => "You are a task management assistant, answer: {{ input }}",
        Intent::General => "You are a general assistant, answer: {{ input }}",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Options shared by every handler unless overridden per intent
    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub handlers: BTreeMap<Intent, HandlerConfig>,

    /// Deadline for each collaborator call, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default = "default_classifier_temperature")]
    pub temperature: f32,

    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,
}

fn default_classifier_temperature() -> f32 {
    0.3
}

fn default_classifier_max_tokens() -> u32 {
    16
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            template: None,
            temperature: default_classifier_temperature(),
            max_tokens: default_classifier_max_tokens(),
        }
    }
}

impl ClassifierConfig {
    pub fn template_source(&self) -> Cow<'_, str> {
        match &self.template {
            Some(template) => Cow::Borrowed(template.as_str()),
            None => Cow::Owned(default_classifier_template()),
        }
    }

    pub fn llm_config(&self) -> LLMConfig {
        LLMConfig::new()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl RouterConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RouterConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouterError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Stored in whole milliseconds. Sub-millisecond timeouts round up to
    /// 1ms and anything past `u64::MAX` ms saturates.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        self.timeout_ms = Some(millis);
        self
    }

    pub fn with_handler_template(mut self, intent: Intent, template: impl Into<String>) -> Self {
        self.handlers.entry(intent).or_default().template = Some(template.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn handler_template(&self, intent: Intent) -> &str {
        self.handlers
            .get(&intent)
            .and_then(|h| h.template.as_deref())
            .unwrap_or_else(|| default_handler_template(intent))
    }

    /// Shared generation options with the intent's overrides applied
    pub fn handler_llm_config(&self, intent: Intent) -> LLMConfig {
        let base = LLMConfig::new()
            .with_temperature(self.generation.temperature)
            .with_max_tokens(self.generation.max_tokens);

        match self.handlers.get(&intent) {
            Some(handler) => base.merge(&LLMConfig {
                temperature: handler.temperature,
                max_tokens: handler.max_tokens,
            }),
            None => base,
        }
    }

    pub fn validate(&self) -> Result<()> {
        PromptTemplate::new(self.classifier.template_source())?;
        check_temperature("classifier", self.classifier.temperature)?;
        check_max_tokens("classifier", self.classifier.max_tokens)?;

        check_temperature("generation", self.generation.temperature)?;
        check_max_tokens("generation", self.generation.max_tokens)?;

        for (intent, handler) in &self.handlers {
            let scope = format!("handlers.{}", intent);
            if let Some(ref template) = handler.template {
                PromptTemplate::new(template.as_str())?;
            }
            if let Some(temperature) = handler.temperature {
                check_temperature(&scope, temperature)?;
            }
            if let Some(max_tokens) = handler.max_tokens {
                check_max_tokens(&scope, max_tokens)?;
            }
        }

        if self.timeout_ms == Some(0) {
            return Err(RouterError::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_temperature(scope: &str, temperature: f32) -> Result<()> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(RouterError::Config(format!(
            "{}.temperature must be within [0, 2], got {}",
            scope, temperature
        )));
    }
    Ok(())
}

fn check_max_tokens(scope: &str, max_tokens: u32) -> Result<()> {
    if max_tokens == 0 {
        return Err(RouterError::Config(format!(
            "{}.max_tokens must be greater than zero",
            scope
        )));
    }
    Ok(())
}

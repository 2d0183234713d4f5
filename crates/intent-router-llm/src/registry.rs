use std::collections::HashMap;
use std::sync::Arc;

use intent_router_core::{LLMProvider, Result, RouterError};

/// Providers for the two routing roles.
///
/// Handlers answer on the `default` alias unless pointed elsewhere.
/// Classification uses its own alias when one is set, so a cheaper model can
/// do the labelling, and shares the handler provider otherwise.
#[derive(Clone)]
pub struct LLMRegistry {
    providers: HashMap<String, Arc<dyn LLMProvider>>,
    handler_alias: String,
    classifier_alias: Option<String>,
}

impl std::fmt::Debug for LLMRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("handler_alias", &self.handler_alias)
            .field("classifier_alias", &self.classifier_alias)
            .finish()
    }
}

impl LLMRegistry {
    pub const DEFAULT_ALIAS: &'static str = "default";

    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            handler_alias: Self::DEFAULT_ALIAS.to_string(),
            classifier_alias: None,
        }
    }

    /// One provider serving both roles
    pub fn single(provider: Arc<dyn LLMProvider>) -> Self {
        let mut registry = Self::new();
        registry.register(Self::DEFAULT_ALIAS, provider);
        registry
    }

    pub fn register(&mut self, alias: impl Into<String>, provider: Arc<dyn LLMProvider>) {
        self.providers.insert(alias.into(), provider);
    }

    pub fn set_handler_alias(&mut self, alias: impl Into<String>) {
        self.handler_alias = alias.into();
    }

    pub fn set_classifier_alias(&mut self, alias: impl Into<String>) {
        self.classifier_alias = Some(alias.into());
    }

    pub fn get(&self, alias: &str) -> Result<Arc<dyn LLMProvider>> {
        self.providers
            .get(alias)
            .cloned()
            .ok_or_else(|| RouterError::Config(format!("LLM alias not found: {}", alias)))
    }

    pub fn handlers(&self) -> Result<Arc<dyn LLMProvider>> {
        self.get(&self.handler_alias)
    }

    pub fn classifier(&self) -> Result<Arc<dyn LLMProvider>> {
        match &self.classifier_alias {
            Some(alias) => self.get(alias),
            None => self.handlers(),
        }
    }
}

impl Default for LLMRegistry {
    fn default() -> Self {
        Self::new()
    }
}

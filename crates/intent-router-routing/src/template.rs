use std::fmt;

use minijinja::Environment;

use intent_router_core::{Result, RouterError};

const TEMPLATE_NAME: &str = "prompt";

/// A prompt with a single `input` slot, e.g.
/// `You are a weather assistant, answer: {{ input }}`.
///
/// Each template owns an environment holding its compiled source, so
/// rendering never re-parses.
#[derive(Clone)]
pub struct PromptTemplate {
    source: String,
    env: Environment<'static>,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        env.add_template_owned(TEMPLATE_NAME, source.clone())
            .map_err(|e| RouterError::Template(format!("Template parse error: {}", e)))?;
        Ok(Self { source, env })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, input: &str) -> Result<String> {
        let tmpl = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| RouterError::Template(format!("Template lookup error: {}", e)))?;

        tmpl.render(minijinja::context! { input => input })
            .map_err(|e| RouterError::Template(format!("Template render error: {}", e)))
    }
}

impl fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PromptTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PromptTemplate {}

//! Router error types

use std::time::Duration;

use thiserror::Error;

use crate::traits::llm::LLMError;
use crate::types::RouteStage;

pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Classification failed: {0}")]
    Classification(#[source] LLMError),

    #[error("Handler '{handler}' failed: {source}")]
    Handler {
        handler: String,
        #[source]
        source: LLMError,
    },

    #[error("Timed out while {stage} after {after:?}")]
    Timeout { stage: RouteStage, after: Duration },

    #[error("Input is empty")]
    EmptyInput,

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Memory error: {0}")]
    Memory(String),
}

impl RouterError {
    pub fn handler(handler: impl Into<String>, source: LLMError) -> Self {
        RouterError::Handler {
            handler: handler.into(),
            source,
        }
    }

    /// The collaborator error underneath a classification or handler failure
    pub fn llm_error(&self) -> Option<&LLMError> {
        match self {
            RouterError::Classification(e) => Some(e),
            RouterError::Handler { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The routing stage this error aborted, if it came from one
    pub fn stage(&self) -> Option<RouteStage> {
        match self {
            RouterError::Classification(_) => Some(RouteStage::Classifying),
            RouterError::Handler { .. } => Some(RouteStage::Handling),
            RouterError::Timeout { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for RouterError {
    fn from(err: serde_yaml::Error) -> Self {
        RouterError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_display() {
        let err = RouterError::handler("weather", LLMError::Network("connection reset".into()));
        assert_eq!(
            err.to_string(),
            "Handler 'weather' failed: Network error: connection reset"
        );
        assert_eq!(err.stage(), Some(RouteStage::Handling));
        assert!(err.llm_error().is_some());
    }

    #[test]
    fn test_timeout_display() {
        let err = RouterError::Timeout {
            stage: RouteStage::Classifying,
            after: Duration::from_millis(50),
        };
        assert_eq!(err.to_string(), "Timed out while classifying after 50ms");
        assert!(err.llm_error().is_none());
    }
}

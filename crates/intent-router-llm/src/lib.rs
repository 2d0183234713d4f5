//! Generation collaborators for the intent router

pub mod mock;
pub mod registry;

pub use intent_router_core::{
    ChatMessage, FinishReason, LLMChunk, LLMConfig, LLMError, LLMFeature, LLMProvider,
    LLMResponse, LLMStream, Role, TokenUsage,
};
pub use mock::{MockCall, MockLLMProvider};
pub use registry::LLMRegistry;

//! Core types and traits for the intent router

pub mod error;
pub mod intent;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{Result, RouterError};
pub use intent::Intent;
pub use message::{ChatMessage, Role};
pub use traits::llm::{LLMError, LLMProvider, LLMStream};
pub use traits::memory::{KeyValueMemory, MemoryItem, Namespace};
pub use types::{FinishReason, LLMChunk, LLMConfig, LLMFeature, LLMResponse, RouteStage, TokenUsage};

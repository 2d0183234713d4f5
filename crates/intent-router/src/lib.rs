//! Intent Router
//!
//! Classifies a user utterance into one of `weather`, `news`, `data`, `task`
//! or `general`, resolves it through an ordered route table with a
//! mandatory default, and runs exactly one handler.

mod logging;

pub use logging::{init_tracing, init_tracing_with_default};

pub mod error {
    pub use intent_router_core::{Result, RouterError};
}

pub mod llm {
    pub use intent_router_core::{
        ChatMessage, FinishReason, LLMChunk, LLMConfig, LLMError, LLMFeature, LLMProvider,
        LLMResponse, LLMStream, Role, TokenUsage,
    };
    pub use intent_router_llm::{LLMRegistry, MockCall, MockLLMProvider};
}

pub mod memory {
    pub use intent_router_memory::{InMemoryKeyValueStore, KeyValueMemory, MemoryItem, Namespace};
}

pub mod routing {
    pub use intent_router_core::{Intent, RouteStage};
    pub use intent_router_routing::{
        ChunkStream, Classifier, ClassifierConfig, GenerationConfig, Handler, HandlerConfig,
        IntentRouter, PromptHandler, PromptTemplate, Route, RouteEntry, RouteTable,
        RouteTableBuilder, RoutedStream, RouterConfig, RoutingRequest, RoutingResponse,
    };
}

pub use error::{Result, RouterError};
pub use routing::{Intent, IntentRouter, RouterConfig, RoutingRequest, RoutingResponse};

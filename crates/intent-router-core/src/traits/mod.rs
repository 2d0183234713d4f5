//! Collaborator traits

pub mod llm;
pub mod memory;

pub use llm::LLMProvider;
pub use memory::KeyValueMemory;

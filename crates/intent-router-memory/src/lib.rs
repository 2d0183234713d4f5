//! Key-value memory implementations

mod in_memory;

pub use in_memory::InMemoryKeyValueStore;
pub use intent_router_core::{KeyValueMemory, MemoryItem, Namespace};

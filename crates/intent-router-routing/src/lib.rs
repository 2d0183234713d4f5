//! Intent classification and first-match dispatch

pub mod classifier;
pub mod config;
pub mod handler;
pub mod route_table;
pub mod router;
pub mod template;

pub use classifier::Classifier;
pub use config::{ClassifierConfig, GenerationConfig, HandlerConfig, RouterConfig};
pub use handler::{ChunkStream, Handler, PromptHandler};
pub use route_table::{Route, RouteEntry, RouteTable, RouteTableBuilder};
pub use router::{IntentRouter, RoutedStream, RoutingRequest, RoutingResponse};
pub use template::PromptTemplate;

//! Ordered first-match dispatch with a mandatory default

use std::fmt;
use std::sync::Arc;

use intent_router_core::{Intent, LLMProvider, Result};

use crate::config::RouterConfig;
use crate::handler::{Handler, PromptHandler};

type Predicate = Arc<dyn Fn(Intent) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct RouteEntry {
    name: String,
    predicate: Predicate,
    handler: Arc<dyn Handler>,
}

impl RouteEntry {
    pub fn new<P>(name: impl Into<String>, predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(Intent) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            handler,
        }
    }

    /// Entry matching exactly `intent`, named after its label
    pub fn for_intent(intent: Intent, handler: Arc<dyn Handler>) -> Self {
        Self::new(intent.label(), move |candidate| candidate == intent, handler)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, intent: Intent) -> bool {
        (self.predicate)(intent)
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("name", &self.name)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// The handler selected for one intent
#[derive(Clone, Copy)]
pub struct Route<'a> {
    pub name: &'a str,
    pub handler: &'a Arc<dyn Handler>,
    pub is_default: bool,
}

/// Read-only after construction. A table cannot exist without a default
/// handler, so `resolve` always yields exactly one handler.
#[derive(Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    default: Arc<dyn Handler>,
}

impl RouteTable {
    pub const DEFAULT_ROUTE: &'static str = "default";

    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// `weather, news, data, task` entries in that order, with the
    /// `general` handler as the default.
    pub fn standard(llm: Arc<dyn LLMProvider>, config: &RouterConfig) -> Result<Self> {
        let mut builder = Self::builder();
        for intent in Intent::SPECIFIC {
            let handler = PromptHandler::for_intent(intent, Arc::clone(&llm), config)?;
            builder = builder.route_intent(intent, Arc::new(handler));
        }
        let general = PromptHandler::for_intent(Intent::General, llm, config)?;
        Ok(builder.build(Arc::new(general)))
    }

    /// First entry whose predicate accepts `intent`, in declaration order,
    /// otherwise the default.
    pub fn resolve(&self, intent: Intent) -> Route<'_> {
        self.entries
            .iter()
            .find(|entry| entry.matches(intent))
            .map(|entry| Route {
                name: entry.name(),
                handler: entry.handler(),
                is_default: false,
            })
            .unwrap_or(Route {
                name: Self::DEFAULT_ROUTE,
                handler: &self.default,
                is_default: true,
            })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Number of routes including the default
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("entries", &self.entries)
            .field("default", &self.default.name())
            .finish()
    }
}

#[derive(Default)]
pub struct RouteTableBuilder {
    entries: Vec<RouteEntry>,
}

impl RouteTableBuilder {
    pub fn entry(mut self, entry: RouteEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn route<P>(self, name: impl Into<String>, predicate: P, handler: Arc<dyn Handler>) -> Self
    where
        P: Fn(Intent) -> bool + Send + Sync + 'static,
    {
        self.entry(RouteEntry::new(name, predicate, handler))
    }

    pub fn route_intent(self, intent: Intent, handler: Arc<dyn Handler>) -> Self {
        self.entry(RouteEntry::for_intent(intent, handler))
    }

    pub fn build(self, default: Arc<dyn Handler>) -> RouteTable {
        RouteTable {
            entries: self.entries,
            default,
        }
    }
}

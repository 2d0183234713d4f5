//! Key-value memory trait

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Hierarchical namespace such as `["demo_user", "memories"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace(Vec<String>);

impl Namespace {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl<const N: usize> From<[&str; N]> for Namespace {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub namespace: Namespace,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-owned key-value store for facts worth remembering across requests.
#[async_trait]
pub trait KeyValueMemory: Send + Sync {
    async fn put(&self, namespace: &Namespace, key: &str, value: serde_json::Value) -> Result<()>;

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<MemoryItem>>;

    /// Items in `namespace` whose key or value text contains `query`
    /// (case-insensitive), ordered by key. The query is trimmed first, so
    /// `None`, an empty string and a whitespace-only string all match every
    /// item.
    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryItem>>;

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<bool>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

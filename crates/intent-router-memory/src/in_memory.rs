use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use intent_router_core::{KeyValueMemory, MemoryItem, Namespace, Result, RouterError};

/// Process-local store. Clones share the same data.
pub struct InMemoryKeyValueStore {
    namespaces: Arc<RwLock<HashMap<Namespace, BTreeMap<String, MemoryItem>>>>,
    max_items_per_namespace: Option<usize>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            namespaces: Arc::new(RwLock::new(HashMap::new())),
            max_items_per_namespace: None,
        }
    }

    /// Reject new keys once a namespace holds `max` items. Replacing an
    /// existing key is always allowed.
    pub fn with_max_items_per_namespace(mut self, max: usize) -> Self {
        self.max_items_per_namespace = Some(max);
        self
    }

    pub fn namespaces(&self) -> Vec<Namespace> {
        let mut namespaces: Vec<Namespace> = self.namespaces.read().keys().cloned().collect();
        namespaces.sort();
        namespaces
    }

    pub fn clear(&self) {
        self.namespaces.write().clear();
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryKeyValueStore {
    fn clone(&self) -> Self {
        Self {
            namespaces: Arc::clone(&self.namespaces),
            max_items_per_namespace: self.max_items_per_namespace,
        }
    }
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            out.push_str(s);
            out.push('\n');
        }
        Value::Number(n) => {
            out.push_str(&n.to_string());
            out.push('\n');
        }
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            out.push('\n');
        }
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_text(v, out)),
        Value::Null => {}
    }
}

fn matches_query(item: &MemoryItem, query: &str) -> bool {
    let mut haystack = item.key.to_lowercase();
    haystack.push('\n');
    collect_text(&item.value, &mut haystack);
    haystack.to_lowercase().contains(query)
}

#[async_trait]
impl KeyValueMemory for InMemoryKeyValueStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: Value) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        let now = Utc::now();

        if let Some(existing) = namespaces
            .get_mut(namespace)
            .and_then(|items| items.get_mut(key))
        {
            existing.value = value;
            existing.updated_at = now;
            debug!(namespace = %namespace, key, "Replaced memory item");
            return Ok(());
        }

        if let Some(max) = self.max_items_per_namespace {
            let current = namespaces.get(namespace).map_or(0, |items| items.len());
            if current >= max {
                return Err(RouterError::Memory(format!(
                    "Namespace '{}' is full ({} items)",
                    namespace, max
                )));
            }
        }

        namespaces.entry(namespace.clone()).or_default().insert(
            key.to_string(),
            MemoryItem {
                namespace: namespace.clone(),
                key: key.to_string(),
                value,
                created_at: now,
                updated_at: now,
            },
        );

        debug!(namespace = %namespace, key, "Stored memory item");
        Ok(())
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<MemoryItem>> {
        Ok(self
            .namespaces
            .read()
            .get(namespace)
            .and_then(|items| items.get(key))
            .cloned())
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryItem>> {
        let namespaces = self.namespaces.read();
        let Some(items) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let query = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
        let limit = limit.unwrap_or(usize::MAX);

        Ok(items
            .values()
            .filter(|item| match &query {
                Some(q) => matches_query(item, q),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<bool> {
        let mut namespaces = self.namespaces.write();
        let Some(items) = namespaces.get_mut(namespace) else {
            return Ok(false);
        };

        let removed = items.remove(key).is_some();
        if items.is_empty() {
            namespaces.remove(namespace);
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.namespaces.read().values().map(|items| items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_ns() -> Namespace {
        Namespace::from(["demo_user", "memories"])
    }

    async fn seeded_store() -> InMemoryKeyValueStore {
        let store = InMemoryKeyValueStore::new();
        let ns = user_ns();
        store
            .put(&ns, "preference", json!({"preference": "User prefers concise answers and technical details."}))
            .await
            .unwrap();
        store
            .put(&ns, "project", json!({"project": "User is working on a routing project."}))
            .await
            .unwrap();
        store
            .put(&ns, "expertise", json!({"expertise": "Intermediate Rust knowledge", "years": 3}))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = seeded_store().await;

        let item = store.get(&user_ns(), "preference").await.unwrap().unwrap();
        assert_eq!(item.key, "preference");
        assert_eq!(item.namespace, user_ns());
        assert!(item.value["preference"].as_str().unwrap().contains("concise"));

        assert!(store.get(&user_ns(), "missing").await.unwrap().is_none());
        assert!(
            store
                .get(&Namespace::from(["other"]), "preference")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_put_replaces_and_keeps_created_at() {
        let store = InMemoryKeyValueStore::new();
        let ns = user_ns();
        store.put(&ns, "mood", json!("calm")).await.unwrap();
        let first = store.get(&ns, "mood").await.unwrap().unwrap();

        store.put(&ns, "mood", json!("busy")).await.unwrap();
        let second = store.get(&ns, "mood").await.unwrap().unwrap();

        assert_eq!(second.value, json!("busy"));
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_search_substring_case_insensitive() {
        let store = seeded_store().await;

        let results = store.search(&user_ns(), Some("RUST"), None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "expertise");

        let by_key = store.search(&user_ns(), Some("proj"), None).await.unwrap();
        assert_eq!(by_key.len(), 1);
        assert_eq!(by_key[0].key, "project");

        let by_number = store.search(&user_ns(), Some("3"), None).await.unwrap();
        assert_eq!(by_number.len(), 1);

        let none = store.search(&user_ns(), Some("weather"), None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_lists_all_in_key_order() {
        let store = seeded_store().await;

        let all = store.search(&user_ns(), None, None).await.unwrap();
        let keys: Vec<&str> = all.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["expertise", "preference", "project"]);

        let limited = store.search(&user_ns(), Some("user"), Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].key, "preference");
    }

    #[tokio::test]
    async fn test_blank_query_lists_everything() {
        let store = seeded_store().await;

        for query in [None, Some(""), Some("   ")] {
            let results = store.search(&user_ns(), query, None).await.unwrap();
            assert_eq!(results.len(), 3, "query: {query:?}");
        }

        let padded = store.search(&user_ns(), Some("  rust "), None).await.unwrap();
        assert_eq!(padded.len(), 1);
        assert_eq!(padded[0].key, "expertise");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = seeded_store().await;

        assert!(store.delete(&user_ns(), "project").await.unwrap());
        assert!(!store.delete(&user_ns(), "project").await.unwrap());
        assert_eq!(store.len(), 2);

        store.delete(&user_ns(), "preference").await.unwrap();
        store.delete(&user_ns(), "expertise").await.unwrap();
        assert!(store.is_empty());
        assert!(store.namespaces().is_empty());
    }

    #[tokio::test]
    async fn test_namespace_capacity() {
        let store = InMemoryKeyValueStore::new().with_max_items_per_namespace(1);
        let ns = user_ns();

        store.put(&ns, "a", json!(1)).await.unwrap();
        store.put(&ns, "a", json!(2)).await.unwrap();
        let err = store.put(&ns, "b", json!(3)).await.unwrap_err();
        assert!(matches!(err, RouterError::Memory(_)));

        store.put(&Namespace::from(["other"]), "b", json!(3)).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store1 = InMemoryKeyValueStore::new();
        let store2 = store1.clone();

        store1.put(&user_ns(), "k", json!("v")).await.unwrap();
        assert_eq!(store2.len(), 1);

        store2.clear();
        assert!(store1.is_empty());
    }
}

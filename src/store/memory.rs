//! In-memory document store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::store::{DocumentStore, StoreError};

/// A thread-safe in-process store, used in local mode and tests.
///
/// Collections are created on first write. `list` returns documents in key
/// order so reads are deterministic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.inner.get(collection).map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .inner
            .get(collection)
            .and_then(|c| c.get(key).cloned()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .inner
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.inner
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        Ok(())
    }

    async fn put_many(
        &self,
        collection: &str,
        docs: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        let mut coll = self.inner.entry(collection.to_string()).or_default();
        for (key, doc) in docs {
            coll.insert(key, doc);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        if let Some(mut coll) = self.inner.get_mut(collection) {
            coll.remove(key);
        }
        Ok(())
    }
}

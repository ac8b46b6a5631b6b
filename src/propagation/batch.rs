//! Chunked bulk writes.

use std::sync::Arc;

use serde_json::Value;

use crate::observability::metrics;
use crate::store::{DocumentStore, StoreError};

/// Store batch limit: documents per bulk call.
pub const DEFAULT_CHUNK_SIZE: usize = 1_000;

/// Splits bulk per-subscriber writes into bounded store calls.
#[derive(Clone)]
pub struct BatchWriter {
    store: Arc<dyn DocumentStore>,
    chunk_size: usize,
}

impl BatchWriter {
    /// `chunk_size` must be non-zero; validated at config load.
    pub fn new(store: Arc<dyn DocumentStore>, chunk_size: usize) -> Self {
        Self { store, chunk_size }
    }

    /// Write all documents to one collection, at most `chunk_size` per bulk
    /// call, chunks strictly in order. Stops at the first failed chunk.
    pub async fn write(
        &self,
        collection: &str,
        mut docs: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        while !docs.is_empty() {
            let tail = if docs.len() > self.chunk_size {
                docs.split_off(self.chunk_size)
            } else {
                Vec::new()
            };
            let chunk_len = docs.len();
            self.store.put_many(collection, docs).await?;
            metrics::record_bulk_write(collection);
            tracing::debug!(collection, chunk_len, "Bulk chunk written");
            docs = tail;
        }
        Ok(())
    }
}

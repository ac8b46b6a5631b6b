//! Document store seam.
//!
//! # Responsibilities
//! - Abstract the keyed document store behind a narrow trait
//! - Name the raw and per-subscriber collections
//! - Provide the in-memory implementation for local mode and tests
//!
//! # Design Decisions
//! - The core only needs read-many / read-one / write / bulk-write / delete
//! - Collections are flat string names; keys are caller-built
//! - Store failures surface to callers; recovery policy lives upstream
//!   (scheduler retry, saga compensation)

pub mod memory;
pub mod raw;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use raw::RawConfigStore;

/// Raw slice documents, keyed by slice name.
pub const SLICE_COLL: &str = "consoleData.snapshots.sliceData";
/// Raw device group documents, keyed by group name.
pub const DEVICE_GROUP_COLL: &str = "consoleData.snapshots.devGroupData";
/// AM policy documents, keyed by subscriber id.
pub const AM_POLICY_COLL: &str = "policyData.ues.amData";
/// SM policy documents, keyed by subscriber id.
pub const SM_POLICY_COLL: &str = "policyData.ues.smData";
/// Provisioned access-and-mobility data, keyed by subscriber id + PLMN.
pub const AM_DATA_COLL: &str = "subscriptionData.provisionedData.amData";
/// Provisioned session-management data, keyed by subscriber id + PLMN.
pub const SM_DATA_COLL: &str = "subscriptionData.provisionedData.smData";
/// SMF selection data, keyed by subscriber id + PLMN.
pub const SMF_SELECTION_COLL: &str =
    "subscriptionData.provisionedData.smfSelectionSubscriptionData";

/// Errors raised by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document did not match the expected shape.
    #[error("decode failed in {collection}: {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized for storage.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Keyed document store operations required by the core.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by key, `None` if absent.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Fetch every document in a collection, ordered by key.
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Upsert one document.
    async fn put(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError>;

    /// Bulk upsert. One backend round trip per call.
    async fn put_many(
        &self,
        collection: &str,
        docs: Vec<(String, Value)>,
    ) -> Result<(), StoreError>;

    /// Delete one document. Deleting an absent key is not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
}

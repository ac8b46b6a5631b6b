//! Compensation stack for the propagation saga.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::observability::metrics;
use crate::store::{
    DocumentStore, StoreError, AM_DATA_COLL, AM_POLICY_COLL, SMF_SELECTION_COLL, SM_DATA_COLL,
    SM_POLICY_COLL,
};

/// One step of the ordered write/delete chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationStep {
    AmPolicy,
    SmPolicy,
    AmData,
    SmData,
    SmfSelection,
}

impl PropagationStep {
    /// The fixed chain order.
    pub const ORDER: [PropagationStep; 5] = [
        PropagationStep::AmPolicy,
        PropagationStep::SmPolicy,
        PropagationStep::AmData,
        PropagationStep::SmData,
        PropagationStep::SmfSelection,
    ];

    /// Target collection of this step.
    pub fn collection(self) -> &'static str {
        match self {
            PropagationStep::AmPolicy => AM_POLICY_COLL,
            PropagationStep::SmPolicy => SM_POLICY_COLL,
            PropagationStep::AmData => AM_DATA_COLL,
            PropagationStep::SmData => SM_DATA_COLL,
            PropagationStep::SmfSelection => SMF_SELECTION_COLL,
        }
    }
}

impl fmt::Display for PropagationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropagationStep::AmPolicy => "AM policy",
            PropagationStep::SmPolicy => "SM policy",
            PropagationStep::AmData => "AM provisioned data",
            PropagationStep::SmData => "SM provisioned data",
            PropagationStep::SmfSelection => "SMF selection data",
        };
        f.write_str(name)
    }
}

/// Errors returned by the propagation saga.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// Reading the raw configuration needed to compute the affected set
    /// failed; no chain was started.
    #[error("raw configuration read failed: {0}")]
    Raw(#[from] StoreError),

    /// A chain step failed and every prior step was rolled back.
    #[error("{step} update failed (rolled back): {source}")]
    Step {
        step: PropagationStep,
        #[source]
        source: StoreError,
    },

    /// A chain step failed and restoring an earlier step also failed.
    /// Not auto-recoverable; an operator must reconcile the named document.
    #[error(
        "{step} update failed: {source}; restoring {undo_collection}/{undo_key} \
         also failed: {undo_source}"
    )]
    Rollback {
        step: PropagationStep,
        #[source]
        source: StoreError,
        undo_collection: String,
        undo_key: String,
        undo_source: StoreError,
    },
}

/// Undo record for one document mutation.
#[derive(Debug)]
struct UndoRecord {
    collection: &'static str,
    key: String,
    /// Content before the mutation; `None` restores by deletion.
    prior: Option<Value>,
}

/// Backup-and-rollback state of one propagation chain.
///
/// Every mutation first reads the prior document and pushes an undo record;
/// `unwind` reapplies the records in reverse order.
pub struct CompensationStack {
    store: Arc<dyn DocumentStore>,
    records: Vec<UndoRecord>,
}

impl CompensationStack {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, records: Vec::new() }
    }

    /// Read and retain the current content of a document about to change.
    pub async fn backup(&mut self, collection: &'static str, key: &str) -> Result<(), StoreError> {
        let prior = self.store.get(collection, key).await?;
        self.records.push(UndoRecord { collection, key: key.to_string(), prior });
        Ok(())
    }

    /// Number of retained undo records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Restore every retained document, newest first.
    ///
    /// On failure returns the offending document's location and the cause;
    /// remaining records are not attempted.
    pub async fn unwind(mut self) -> Result<(), (String, String, StoreError)> {
        while let Some(record) = self.records.pop() {
            let result = match record.prior {
                Some(doc) => self.store.put(record.collection, &record.key, doc).await,
                None => self.store.delete(record.collection, &record.key).await,
            };
            if let Err(e) = result {
                metrics::record_saga_rollback("failed");
                return Err((record.collection.to_string(), record.key, e));
            }
        }
        metrics::record_saga_rollback("restored");
        Ok(())
    }
}

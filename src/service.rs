//! The console core service object.
//!
//! # Responsibilities
//! - Own the store handle, view cache, raw-store guard, propagator, and
//!   the scheduler trigger; constructed once, shared by reference
//! - Provide the write-time consistency hook for slice/device-group
//!   mutations
//! - Serve derived-view reads from the cached snapshot
//!
//! # Design Decisions
//! - Every write: lock guard → persist raw doc → propagate → unlock →
//!   trigger sync; propagation failures surface to the caller with the
//!   failed step named
//! - Reads never take the guard; they only load the snapshot pointer

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::ViewCache;
use crate::config::ConsoleConfig;
use crate::derivation::{ImsiQosEntry, ViewSnapshot};
use crate::model::{DeviceGroup, Slice};
use crate::propagation::{PropagationError, SubscriberConsistencyPropagator};
use crate::store::{DocumentStore, RawConfigStore, StoreError};
use crate::sync::{SyncHandle, SyncPolicy, SyncScheduler};

/// Errors surfaced by the write-time consistency hook.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Propagation(#[from] PropagationError),
}

/// Owner of the core's shared state, handed to every consumer by reference.
pub struct ConsoleService {
    raw: RawConfigStore,
    cache: Arc<ViewCache>,
    guard: Arc<Mutex<()>>,
    propagator: SubscriberConsistencyPropagator,
    sync: SyncHandle,
}

impl ConsoleService {
    /// Build the service and the sync scheduler that feeds its cache.
    ///
    /// The scheduler is returned unstarted; the caller spawns its `run`
    /// loop with the process shutdown receiver.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        config: &ConsoleConfig,
    ) -> (Arc<Self>, SyncScheduler) {
        let cache = Arc::new(ViewCache::new());
        let guard = Arc::new(Mutex::new(()));
        let raw = RawConfigStore::new(store.clone());

        let policy = SyncPolicy {
            retry_delay: std::time::Duration::from_millis(config.sync.retry_delay_ms),
            max_attempts: config.sync.max_attempts,
        };
        let (scheduler, sync) =
            SyncScheduler::new(raw.clone(), cache.clone(), guard.clone(), policy);

        let propagator =
            SubscriberConsistencyPropagator::new(store, config.batch.chunk_size);

        let service = Arc::new(Self { raw, cache, guard, propagator, sync });
        (service, scheduler)
    }

    /// Create or update a slice, keeping per-subscriber documents in step.
    pub async fn upsert_slice(&self, slice: Slice) -> Result<(), ServiceError> {
        {
            let _guard = self.guard.lock().await;
            let prev = self.raw.slice(&slice.slice_name).await?;
            self.raw.put_slice(&slice).await?;
            self.propagator.slice_changed(prev.as_ref(), Some(&slice)).await?;
        }
        self.sync.trigger_sync();
        Ok(())
    }

    /// Delete a slice and retract its subscribers' documents.
    pub async fn delete_slice(&self, name: &str) -> Result<(), ServiceError> {
        {
            let _guard = self.guard.lock().await;
            let Some(prev) = self.raw.slice(name).await? else {
                return Ok(());
            };
            self.raw.delete_slice(name).await?;
            self.propagator.slice_changed(Some(&prev), None).await?;
        }
        self.sync.trigger_sync();
        Ok(())
    }

    /// Create or update a device group, keeping per-subscriber documents in
    /// step.
    pub async fn upsert_device_group(&self, group: DeviceGroup) -> Result<(), ServiceError> {
        {
            let _guard = self.guard.lock().await;
            let prev = self.raw.device_group(&group.device_group_name).await?;
            self.raw.put_device_group(&group).await?;
            self.propagator.device_group_changed(prev.as_ref(), Some(&group)).await?;
        }
        self.sync.trigger_sync();
        Ok(())
    }

    /// Delete a device group and retract its members' documents.
    pub async fn delete_device_group(&self, name: &str) -> Result<(), ServiceError> {
        {
            let _guard = self.guard.lock().await;
            let Some(prev) = self.raw.device_group(name).await? else {
                return Ok(());
            };
            self.raw.delete_device_group(name).await?;
            self.propagator.device_group_changed(Some(&prev), None).await?;
        }
        self.sync.trigger_sync();
        Ok(())
    }

    /// The payload-less "raw configuration changed" notification.
    pub fn notify_config_changed(&self) {
        self.sync.trigger_sync();
    }

    /// The current derived-view snapshot.
    pub fn views(&self) -> Arc<ViewSnapshot> {
        self.cache.load()
    }

    /// QoS for a (DNN, subscriber) pair, `None` when no entry matches.
    pub fn imsi_qos(&self, dnn: &str, imsi: &str) -> Option<ImsiQosEntry> {
        self.views()
            .imsi_qos
            .iter()
            .find(|e| e.dnn == dnn && e.imsis.iter().any(|i| i == imsi))
            .cloned()
    }
}

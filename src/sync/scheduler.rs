//! Trigger-driven sync loop.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, Notify};
use tokio::time;

use crate::cache::ViewCache;
use crate::derivation::derive_all;
use crate::observability::metrics;
use crate::store::{RawConfigStore, StoreError};

/// Retry policy for failed sync passes.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Attempts per trigger before giving up; `None` retries until success.
    pub max_attempts: Option<u32>,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncState {
    Idle = 0,
    Running = 1,
    Backoff = 2,
}

impl SyncState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => SyncState::Running,
            2 => SyncState::Backoff,
            _ => SyncState::Idle,
        }
    }
}

/// Cloneable trigger handle handed to the write path.
#[derive(Clone)]
pub struct SyncHandle {
    trigger: Arc<Notify>,
    state: Arc<AtomicU8>,
}

impl SyncHandle {
    /// Signal that the raw configuration changed.
    ///
    /// If a pass is already running this stores one pending permit, so the
    /// change is picked up by a follow-up pass rather than dropped.
    pub fn trigger_sync(&self) {
        self.trigger.notify_one();
    }

    /// Current state of the sync loop.
    pub fn state(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Re-derives the view cache whenever the raw configuration changes.
pub struct SyncScheduler {
    raw: RawConfigStore,
    cache: Arc<ViewCache>,
    guard: Arc<Mutex<()>>,
    policy: SyncPolicy,
    trigger: Arc<Notify>,
    state: Arc<AtomicU8>,
}

impl SyncScheduler {
    /// Create a scheduler and its trigger handle.
    ///
    /// `guard` is the raw-store mutual-exclusion lock shared with the
    /// consistency propagator.
    pub fn new(
        raw: RawConfigStore,
        cache: Arc<ViewCache>,
        guard: Arc<Mutex<()>>,
        policy: SyncPolicy,
    ) -> (Self, SyncHandle) {
        let trigger = Arc::new(Notify::new());
        let state = Arc::new(AtomicU8::new(SyncState::Idle as u8));
        let handle = SyncHandle {
            trigger: trigger.clone(),
            state: state.clone(),
        };
        (
            Self { raw, cache, guard, policy, trigger, state },
            handle,
        )
    }

    /// One fetch → derive → swap pass.
    ///
    /// On any failure the cache is left untouched and the error is returned
    /// to the retry loop.
    pub async fn sync_once(&self) -> Result<(), StoreError> {
        let (slices, device_groups) = {
            let _guard = self.guard.lock().await;
            (self.raw.slices().await?, self.raw.device_groups().await?)
        };

        let snapshot = derive_all(&slices, &device_groups);
        tracing::info!(
            slices = slices.len(),
            device_groups = device_groups.len(),
            plmns = snapshot.plmn.len(),
            "Derived view snapshot installed"
        );
        self.cache.replace(snapshot);
        Ok(())
    }

    /// Run until the shutdown broadcast fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            retry_delay_ms = self.policy.retry_delay.as_millis() as u64,
            max_attempts = ?self.policy.max_attempts,
            "Sync scheduler starting"
        );

        loop {
            tokio::select! {
                _ = self.trigger.notified() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Sync scheduler received shutdown signal, exiting loop");
                    break;
                }
            }

            self.set_state(SyncState::Running);
            let mut attempt: u32 = 0;
            loop {
                match self.sync_once().await {
                    Ok(()) => {
                        metrics::record_sync_run("success");
                        break;
                    }
                    Err(e) => {
                        attempt += 1;
                        metrics::record_sync_run("failure");
                        if self
                            .policy
                            .max_attempts
                            .is_some_and(|max| attempt >= max)
                        {
                            tracing::error!(
                                attempt,
                                error = %e,
                                "Sync attempts exhausted; keeping previous snapshot"
                            );
                            break;
                        }

                        tracing::warn!(
                            attempt,
                            retry_in_ms = self.policy.retry_delay.as_millis() as u64,
                            error = %e,
                            "Sync pass failed, retrying"
                        );
                        self.set_state(SyncState::Backoff);
                        tokio::select! {
                            _ = time::sleep(self.policy.retry_delay) => {}
                            _ = shutdown.recv() => {
                                tracing::info!("Sync scheduler shut down during backoff");
                                self.set_state(SyncState::Idle);
                                return;
                            }
                        }
                        self.set_state(SyncState::Running);
                    }
                }
            }
            self.set_state(SyncState::Idle);
        }
    }

    fn set_state(&self, state: SyncState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

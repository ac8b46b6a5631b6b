//! Sync scheduler failure injection and trigger coalescing.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time;

use config_console::cache::ViewCache;
use config_console::store::RawConfigStore;
use config_console::sync::{SyncPolicy, SyncScheduler, SyncState};

mod common;

use common::{slice, FlakyStore};

fn build_scheduler(
    store: Arc<FlakyStore>,
    retry_delay_ms: u64,
) -> (SyncScheduler, config_console::sync::SyncHandle, Arc<ViewCache>) {
    let cache = Arc::new(ViewCache::new());
    let (scheduler, handle) = SyncScheduler::new(
        RawConfigStore::new(store),
        cache.clone(),
        Arc::new(Mutex::new(())),
        SyncPolicy {
            retry_delay: Duration::from_millis(retry_delay_ms),
            max_attempts: None,
        },
    );
    (scheduler, handle, cache)
}

async fn wait_for<F: Fn() -> bool>(cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

// A failed fetch must leave the previous snapshot exactly as it was; a
// later successful pass picks up the new state.
#[tokio::test]
async fn test_failed_sync_keeps_previous_snapshot() {
    let store = Arc::new(FlakyStore::new());
    let raw = RawConfigStore::new(store.clone());
    raw.put_slice(&slice("alpha", "1", "01", "001", "01", &[1]))
        .await
        .unwrap();

    let (scheduler, _handle, cache) = build_scheduler(store.clone(), 10);
    scheduler.sync_once().await.unwrap();

    let baseline = cache.load();
    assert_eq!(baseline.plmn.len(), 1);

    // New raw state arrives, but the store starts failing
    raw.put_slice(&slice("beta", "2", "", "310", "410", &[2]))
        .await
        .unwrap();
    store.fail_next_lists(1);

    assert!(scheduler.sync_once().await.is_err());
    let after_failure = cache.load();
    assert_eq!(after_failure.plmn, baseline.plmn);
    assert_eq!(after_failure.plmn_snssai, baseline.plmn_snssai);

    // Retry succeeds and installs the new generation
    scheduler.sync_once().await.unwrap();
    assert_eq!(cache.load().plmn.len(), 2);
}

// The retry loop keeps attempting after failures until a pass succeeds.
#[tokio::test]
async fn test_retry_until_success() {
    let store = Arc::new(FlakyStore::new());
    let raw = RawConfigStore::new(store.clone());
    raw.put_slice(&slice("alpha", "1", "01", "001", "01", &[1]))
        .await
        .unwrap();

    // First two attempts fail, the third succeeds
    store.fail_next_lists(2);

    let (scheduler, handle, cache) = build_scheduler(store.clone(), 10);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(scheduler.run(shutdown_rx));

    handle.trigger_sync();
    wait_for(|| !cache.load().plmn.is_empty()).await;
    wait_for(|| handle.state() == SyncState::Idle).await;

    // Two failed fetches plus the successful pass's two collection reads
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 4);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

// Triggers arriving while a pass is running collapse into exactly one
// follow-up pass: none dropped, none duplicated.
#[tokio::test]
async fn test_triggers_during_pass_coalesce() {
    let store = Arc::new(FlakyStore::new());
    let raw = RawConfigStore::new(store.clone());
    raw.put_slice(&slice("alpha", "1", "01", "001", "01", &[1]))
        .await
        .unwrap();
    store.set_list_delay(Duration::from_millis(50));

    let (scheduler, handle, cache) = build_scheduler(store.clone(), 10);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(scheduler.run(shutdown_rx));

    handle.trigger_sync();
    wait_for(|| handle.state() == SyncState::Running).await;

    // Burst of triggers while the first pass is still fetching
    handle.trigger_sync();
    handle.trigger_sync();
    handle.trigger_sync();

    wait_for(|| !cache.load().plmn.is_empty()).await;
    wait_for(|| handle.state() == SyncState::Idle).await;
    // Drain the one coalesced follow-up pass
    time::sleep(Duration::from_millis(300)).await;

    // Two passes total, two collection reads each
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 4);

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

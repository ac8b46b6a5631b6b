//! In-memory cache of the derived views.
//!
//! # Responsibilities
//! - Hold the last successfully derived `ViewSnapshot`
//! - Swap all six views in one atomic step
//! - Serve readers without locks
//!
//! # Design Decisions
//! - `arc-swap` pointer swap instead of a read/write lock: readers are
//!   wait-free and can never observe a view set mixing two generations
//! - A failed derivation never reaches `replace`; the previous snapshot
//!   stays authoritative (staleness over unavailability)

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::derivation::ViewSnapshot;

/// Atomically replaceable holder of the six derived views.
#[derive(Default)]
pub struct ViewCache {
    inner: ArcSwap<ViewSnapshot>,
}

impl ViewCache {
    /// Create a cache holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly derived snapshot, replacing all six views at once.
    pub fn replace(&self, snapshot: ViewSnapshot) {
        self.inner.store(Arc::new(snapshot));
    }

    /// The current snapshot. Callers may hold it arbitrarily long; it is
    /// immutable and detached from future swaps.
    pub fn load(&self) -> Arc<ViewSnapshot> {
        self.inner.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Plmn;

    #[test]
    fn test_starts_empty() {
        let cache = ViewCache::new();
        let snap = cache.load();
        assert!(snap.plmn.is_empty());
        assert!(snap.imsi_qos.is_empty());
    }

    #[test]
    fn test_replace_swaps_whole_snapshot() {
        let cache = ViewCache::new();
        let held = cache.load();

        let mut snapshot = ViewSnapshot::default();
        snapshot.plmn.push(Plmn { mcc: "001".into(), mnc: "01".into() });
        cache.replace(snapshot);

        // The earlier read is unaffected; new reads see the new generation
        assert!(held.plmn.is_empty());
        assert_eq!(cache.load().plmn.len(), 1);
    }
}

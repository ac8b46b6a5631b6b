//! Metrics collection.
//!
//! # Metrics
//! - `console_sync_runs_total` (counter): sync passes by outcome
//! - `console_derivation_skips_total` (counter): records skipped during
//!   derivation, by reason (sst, upf_port)
//! - `console_saga_rollbacks_total` (counter): compensation unwinds by
//!   outcome (restored, failed)
//! - `console_store_bulk_writes_total` (counter): chunked bulk store calls
//!
//! # Design Decisions
//! - Low-overhead updates through the `metrics` facade
//! - No exporter here; recorder installation is a deployment concern

/// Record a completed sync pass.
pub fn record_sync_run(outcome: &'static str) {
    metrics::counter!("console_sync_runs_total", "outcome" => outcome).increment(1);
}

/// Record a record skipped during derivation.
pub fn record_derivation_skip(reason: &'static str) {
    metrics::counter!("console_derivation_skips_total", "reason" => reason).increment(1);
}

/// Record a saga compensation unwind.
pub fn record_saga_rollback(outcome: &'static str) {
    metrics::counter!("console_saga_rollbacks_total", "outcome" => outcome).increment(1);
}

/// Record one chunked bulk write issued to the store.
pub fn record_bulk_write(collection: &str) {
    metrics::counter!(
        "console_store_bulk_writes_total",
        "collection" => collection.to_string()
    )
    .increment(1);
}

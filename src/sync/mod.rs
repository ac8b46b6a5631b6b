//! Background synchronization of the derived-view cache.
//!
//! # States
//! - Idle: waiting for a "configuration changed" trigger
//! - Running: fetch → derive → swap in flight
//! - Backoff: last pass failed, retry timer armed
//!
//! # State Transitions
//! ```text
//! Idle → Running: trigger arrives (or a pending permit is waiting)
//! Running → Idle: pass succeeded, or attempt ceiling reached
//! Running → Backoff: pass failed
//! Backoff → Running: retry timer fires
//! ```
//!
//! # Design Decisions
//! - A trigger during a running pass stores a single permit: no trigger is
//!   dropped, no second pass races the cache
//! - Retries sleep on a timer, never busy-poll
//! - The loop only exits on the shutdown broadcast

pub mod scheduler;

pub use scheduler::{SyncHandle, SyncPolicy, SyncScheduler, SyncState};

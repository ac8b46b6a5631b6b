//! Derivation of network-function-facing views.
//!
//! # Responsibilities
//! - Transform the full raw slice/device-group set into six derived views
//! - Normalize, deduplicate, and sort every view deterministically
//! - Absorb per-record errors; one malformed slice never affects another
//!
//! # Design Decisions
//! - `derive_all` is a pure function: no store access, no mutation, no
//!   partial failure
//! - Grouping goes through BTree maps so output order is independent of
//!   input order
//! - Views are regenerated wholesale on every sync, never patched

pub mod bitrate;
pub mod engine;
pub mod views;

pub use engine::derive_all;
pub use views::{
    AccessAndMobilityEntry, Arp, ImsiQosEntry, PccFlowInfo, PccQos, PccRule, PlmnSnssaiEntry,
    PolicyControlEntry, SessionManagementEntry, Snssai, UpfInfo, ViewSnapshot,
};

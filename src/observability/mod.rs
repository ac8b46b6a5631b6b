//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters on sync, derivation, saga paths)
//!
//! Consumers:
//!     → Log aggregation (stdout, file, remote)
//!     → Any installed metrics recorder
//! ```
//!
//! # Design Decisions
//! - Structured key-value logging throughout; no bare format strings for
//!   fields a dashboard would filter on
//! - Counters go through the `metrics` facade; installing an exporter is a
//!   deployment concern, not this crate's
//! - Metric updates are cheap (atomic increments)

pub mod logging;
pub mod metrics;

//! Write-side subscriber consistency propagation.
//!
//! # Responsibilities
//! - Keep the five per-subscriber collections in agreement with
//!   slice/device-group membership
//! - Compensate partial failures: restore every already-written document
//! - Chunk bulk writes to respect store batch limits
//!
//! # Data Flow
//! ```text
//! slice / device-group create/update/delete (already persisted)
//!     → propagator computes affected subscriber set
//!     → ordered chain: AM policy → SM policy → AM data → SM data → SMF selection
//!         each step: back up priors, then one chunked bulk write
//!     → on step failure: unwind the compensation stack in reverse
//! ```
//!
//! # Design Decisions
//! - Invoked synchronously by the write path, under the raw-store guard
//! - Chain steps and batch chunks run strictly sequentially so the rollback
//!   point is always well defined
//! - A failed rollback is reported distinctly (original + restoration
//!   cause); no further automatic recovery

pub mod batch;
pub mod documents;
pub mod propagator;
pub mod saga;

pub use batch::BatchWriter;
pub use propagator::SubscriberConsistencyPropagator;
pub use saga::{CompensationStack, PropagationError, PropagationStep};

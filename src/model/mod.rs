//! Raw configuration documents.
//!
//! # Data Flow
//! ```text
//! management API writes
//!     → Slice / DeviceGroup documents (this module)
//!     → persisted in the raw document store
//!     → read wholesale by the derivation engine
//!     → read incrementally by the consistency propagator
//! ```
//!
//! # Design Decisions
//! - Field names mirror the wire/store form (camelCase, dashed UPF keys)
//! - Optional keys are explicit `Option`s, no runtime type probing
//! - Documents are plain data; all interpretation lives in `derivation`

pub mod device_group;
pub mod slice;

pub use device_group::{DeviceGroup, IpDomain, UeDnnQos};
pub use slice::{AppFilterRule, GNodeB, Plmn, SiteInfo, Slice, SliceId, TrafficClass, Upf};

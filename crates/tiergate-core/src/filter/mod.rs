//! Response filtering (normalize, redact, cap, promote).
//!
//! The engine is a pure transform over `serde_json::Value`: it never touches
//! the registry mutably, performs no I/O, and logs only truncation events and
//! missing-policy pass-throughs.

pub mod engine;
pub mod monthly;
pub mod normalize;

pub use engine::{FilteredResponse, FilteringEngine};
pub use normalize::{normalize, RawPayload};

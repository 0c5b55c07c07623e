//! tierGate core: tier classification, access policies, and the response
//! filtering engine.
//!
//! This crate turns a raw upstream payload (hotel search results, itinerary
//! optimizations) into the view a caller's tier is entitled to. It carries no
//! transport or runtime dependencies; the gateway crate wires it into HTTP.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Filtering is total: missing configuration degrades open instead of
//! failing, and configuration problems surface as `TierGateError` at load time.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod filter;
pub mod introspect;
pub mod path;
pub mod policy;
pub mod tier;

/// Shared result type.
pub use error::{Result, TierGateError};
pub use filter::{FilteredResponse, FilteringEngine, RawPayload};
pub use policy::AccessPolicyRegistry;
pub use tier::{classify, Caller, Identity, Tier};

//! tierGate gateway library entry.
//!
//! This crate wires the core filtering engine into an axum stack: config
//! loading, caller resolution, the access introspection routes, the
//! response-filtering middleware and per-tier rate limiting. It is consumed by
//! the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod access;
pub mod app_state;
pub mod config;
pub mod context;
pub mod error;
pub mod filter_layer;
pub mod ops;
pub mod ratelimit;
pub mod router;
pub mod sample;

//! Per-request caller context shared across handlers and middleware.

pub mod caller;

pub use caller::CurrentCaller;

//! Top-level facade crate for tierGate.
//!
//! Re-exports the filtering core and the gateway library so users can depend
//! on a single crate.

pub mod core {
    pub use tiergate_core::*;
}

pub mod gateway {
    pub use tiergate_gateway::*;
}

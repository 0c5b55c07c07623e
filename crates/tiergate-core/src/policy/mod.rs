//! Access policy layer (field visibility, result caps, exposure flags).
//!
//! Policies are declarative YAML records compiled once into an immutable
//! `AccessPolicyRegistry` that the filtering engine and introspection read
//! concurrently.

pub mod model;
pub mod registry;
pub mod schema;

use crate::error::{Result, TierGateError};

pub use model::{EndpointPolicy, FieldOutcome, FieldPolicy};
pub use registry::AccessPolicyRegistry;
pub use schema::{
    AccessConfig, EndpointConfig, ExposureFlags, FieldConfig, LimitMode, PromotionalMessage,
    RateLimit,
};

/// Hotel search endpoint id.
pub const HOTEL_SEARCH: &str = "/hotels/search";
/// Itinerary optimization endpoint id.
pub const ITINERARY_OPTIMIZE: &str = "/itineraries/optimize";

const BUILTIN_POLICIES: &str = include_str!("../../policies.yaml");

/// Parse and validate a policy set from YAML (strict).
pub fn load_from_str(s: &str) -> Result<AccessConfig> {
    let cfg: AccessConfig = serde_yaml::from_str(s)
        .map_err(|e| TierGateError::BadRequest(format!("invalid access policy yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// The policy set shipped with the crate.
pub fn builtin_config() -> Result<AccessConfig> {
    load_from_str(BUILTIN_POLICIES)
}

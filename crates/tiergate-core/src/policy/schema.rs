use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, TierGateError};
use crate::tier::Tier;

/// Declarative access policy set, as written in YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    pub exposure: BTreeMap<Tier, ExposureFlags>,

    #[serde(default)]
    pub promotions: BTreeMap<String, PromotionalMessage>,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl AccessConfig {
    pub fn validate(&self) -> Result<()> {
        for tier in Tier::ALL {
            if !self.exposure.contains_key(&tier) {
                return Err(TierGateError::BadRequest(format!(
                    "access.exposure is missing tier {tier}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for ep in &self.endpoints {
            if !seen.insert(ep.endpoint.as_str()) {
                return Err(TierGateError::BadRequest(format!(
                    "duplicate endpoint policy: {}",
                    ep.endpoint
                )));
            }
            ep.validate()?;
        }
        Ok(())
    }
}

/// Coarse per-tier capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExposureFlags {
    pub show_hotel_ids: bool,
    pub show_exact_prices: bool,
    pub show_availability_details: bool,
    pub show_optimization_insights: bool,
    #[serde(default)]
    pub max_search_results: Option<u32>,
    #[serde(default)]
    pub max_itinerary_options: Option<u32>,
    pub show_promotional_messages: bool,
    #[serde(default)]
    pub show_debug_info: bool,
}

impl ExposureFlags {
    /// Flags for a tier with no configuration: nothing exposed, no promotions.
    pub const NONE: ExposureFlags = ExposureFlags {
        show_hotel_ids: false,
        show_exact_prices: false,
        show_availability_details: false,
        show_optimization_insights: false,
        max_search_results: None,
        max_itinerary_options: None,
        show_promotional_messages: false,
        show_debug_info: false,
    };
}

/// Upsell copy attached to responses for lower tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromotionalMessage {
    pub message: String,
    pub cta: String,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// How result caps are applied for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMode {
    /// Truncate bare arrays and `results` arrays.
    #[default]
    Truncate,
    /// Month-grouped itinerary results collapse to the nearest option.
    MonthlyNearest,
}

/// Request budget consumed by the gateway's rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimit {
    pub requests: u32,
    pub per_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub endpoint: String,

    /// Prefix of the promotional message keys (`{family}_{tier}`).
    #[serde(default)]
    pub promo_family: Option<String>,

    #[serde(default)]
    pub limit_mode: LimitMode,

    /// Missing tier or `~` means unlimited.
    #[serde(default)]
    pub max_results: BTreeMap<Tier, Option<u32>>,

    #[serde(default)]
    pub rate_limits: BTreeMap<Tier, RateLimit>,

    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with('/') {
            return Err(TierGateError::BadRequest(format!(
                "endpoint id must start with '/': {}",
                self.endpoint
            )));
        }

        for (tier, cap) in &self.max_results {
            if *cap == Some(0) {
                return Err(TierGateError::BadRequest(format!(
                    "{}: max_results for {tier} must be at least 1 (omit it for unlimited)",
                    self.endpoint
                )));
            }
        }

        for (tier, rl) in &self.rate_limits {
            if rl.requests == 0 || rl.per_minutes == 0 {
                return Err(TierGateError::BadRequest(format!(
                    "{}: rate_limits for {tier} must be non-zero",
                    self.endpoint
                )));
            }
        }

        let mut names = HashSet::new();
        for f in &self.fields {
            if !names.insert(f.field.as_str()) {
                return Err(TierGateError::BadRequest(format!(
                    "{}: duplicate field policy: {}",
                    self.endpoint, f.field
                )));
            }
            f.validate(&self.endpoint)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub field: String,

    pub visible_to: Vec<Tier>,

    /// Absent: hidden field is omitted. Present (even `~` or `[]`): replacement.
    #[serde(default, deserialize_with = "present")]
    pub masked_value: Option<Value>,

    #[serde(default)]
    pub description: Option<String>,
}

impl FieldConfig {
    /// A field visible to some tier must be visible to every tier above it.
    fn validate(&self, endpoint: &str) -> Result<()> {
        let Some(lowest) = self.visible_to.iter().min() else {
            return Ok(());
        };
        for tier in Tier::ALL.into_iter().filter(|t| t > lowest) {
            if !self.visible_to.contains(&tier) {
                return Err(TierGateError::BadRequest(format!(
                    "{endpoint}: field {} is visible to {lowest} but not to {tier}",
                    self.field
                )));
            }
        }
        Ok(())
    }
}

/// Distinguishes an explicit `null` from a missing key.
fn present<'de, D, T>(d: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

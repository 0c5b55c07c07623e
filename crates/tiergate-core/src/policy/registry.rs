use std::collections::BTreeMap;

use crate::error::Result;
use crate::tier::Tier;

use super::model::EndpointPolicy;
use super::schema::{AccessConfig, ExposureFlags, PromotionalMessage};

/// Process-wide, read-only access policy set.
///
/// Built once at startup and shared behind an `Arc`; lookups never lock.
/// Missing keys yield `None` so callers can degrade open.
#[derive(Debug, Clone)]
pub struct AccessPolicyRegistry {
    endpoints: BTreeMap<String, EndpointPolicy>,
    exposure: BTreeMap<Tier, ExposureFlags>,
    promotions: BTreeMap<String, PromotionalMessage>,
}

impl AccessPolicyRegistry {
    /// Compile a policy set. Validates first.
    pub fn from_config(cfg: &AccessConfig) -> Result<Self> {
        cfg.validate()?;

        let endpoints = cfg
            .endpoints
            .iter()
            .map(|ep| (ep.endpoint.clone(), EndpointPolicy::new(ep)))
            .collect();

        Ok(Self {
            endpoints,
            exposure: cfg.exposure.clone(),
            promotions: cfg.promotions.clone(),
        })
    }

    /// The policy set shipped with the crate (`policies.yaml`).
    pub fn builtin() -> Result<Self> {
        Self::from_config(&super::builtin_config()?)
    }

    pub fn policy_for(&self, endpoint_id: &str) -> Option<&EndpointPolicy> {
        self.endpoints.get(endpoint_id)
    }

    pub fn policies(&self) -> impl Iterator<Item = &EndpointPolicy> {
        self.endpoints.values()
    }

    pub fn endpoint_ids(&self) -> Vec<String> {
        self.endpoints.keys().cloned().collect()
    }

    pub fn exposure_flags(&self, tier: Tier) -> &ExposureFlags {
        self.exposure.get(&tier).unwrap_or(&ExposureFlags::NONE)
    }

    pub fn promotional_message(&self, family: &str, tier: Tier) -> Option<&PromotionalMessage> {
        self.promotions.get(&promo_key(family, tier))
    }

    /// Every promotional message addressed to `tier`, keyed by message key.
    pub fn promotions_for(&self, tier: Tier) -> impl Iterator<Item = (&str, &PromotionalMessage)> {
        let suffix = format!("_{tier}");
        self.promotions
            .iter()
            .filter(move |(key, _)| key.ends_with(&suffix))
            .map(|(key, msg)| (key.as_str(), msg))
    }

    /// Result cap of every endpoint for one tier (`None` = unlimited).
    pub fn endpoint_limits(&self, tier: Tier) -> BTreeMap<String, Option<u32>> {
        self.endpoints
            .iter()
            .map(|(id, p)| (id.clone(), p.max_results(tier)))
            .collect()
    }
}

/// Promotional messages are keyed `{family}_{tier}`.
pub fn promo_key(family: &str, tier: Tier) -> String {
    format!("{family}_{tier}")
}

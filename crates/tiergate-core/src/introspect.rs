//! Read-only entitlement reports for clients and docs.
//!
//! Thin views over the classifier, the registry and the engine; nothing here
//! has its own rules.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::filter::{FilteredResponse, FilteringEngine};
use crate::policy::{
    AccessPolicyRegistry, ExposureFlags, FieldOutcome, PromotionalMessage, RateLimit, HOTEL_SEARCH,
    ITINERARY_OPTIMIZE,
};
use crate::tier::{classify, Caller, Identity, Tier};

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub is_authenticated: bool,
    pub user_id: Option<u64>,
    pub is_superuser: bool,
    pub is_premium: bool,
}

/// "What can I see?" for one caller.
#[derive(Debug, Clone, Serialize)]
pub struct AccessSummary {
    pub user_tier: Tier,
    pub permissions: ExposureFlags,
    pub endpoint_limits: BTreeMap<String, Option<u32>>,
    pub promotional_messages: BTreeMap<String, PromotionalMessage>,
    pub user_info: UserInfo,
}

pub fn access_summary(registry: &AccessPolicyRegistry, identity: Option<&dyn Identity>) -> AccessSummary {
    let tier = classify(identity);
    let permissions = registry.exposure_flags(tier).clone();

    let promotional_messages = if permissions.show_promotional_messages && !tier.is_paying() {
        registry
            .promotions_for(tier)
            .map(|(key, msg)| (key.to_string(), msg.clone()))
            .collect()
    } else {
        BTreeMap::new()
    };

    AccessSummary {
        user_tier: tier,
        endpoint_limits: registry.endpoint_limits(tier),
        permissions,
        promotional_messages,
        user_info: UserInfo {
            is_authenticated: identity.is_some(),
            user_id: identity.and_then(|id| id.user_id()),
            is_superuser: identity.is_some_and(|id| id.is_admin()),
            is_premium: identity.is_some_and(|id| id.is_premium()),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TierInfo {
    pub permissions: ExposureFlags,
    pub endpoint_limits: BTreeMap<String, Option<u32>>,
    pub description: &'static str,
}

/// Every tier with its policy and upgrade path.
#[derive(Debug, Clone, Serialize)]
pub struct TierCatalog {
    pub access_tiers: BTreeMap<&'static str, TierInfo>,
    pub upgrade_path: BTreeMap<&'static str, &'static str>,
}

pub fn tier_catalog(registry: &AccessPolicyRegistry) -> TierCatalog {
    let access_tiers = Tier::ALL
        .into_iter()
        .map(|tier| {
            let info = TierInfo {
                permissions: registry.exposure_flags(tier).clone(),
                endpoint_limits: registry.endpoint_limits(tier),
                description: tier.description(),
            };
            (tier.as_str(), info)
        })
        .collect();
    let upgrade_path = Tier::ALL
        .into_iter()
        .map(|tier| (tier.as_str(), tier.upgrade_path()))
        .collect();

    TierCatalog { access_tiers, upgrade_path }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldAccess {
    pub visible: bool,
    /// `visible`, `masked` or `omitted`.
    pub outcome: &'static str,
    /// Replacement shown instead of the value; `null` when visible or omitted.
    pub masked_value: Option<Value>,
    pub description: Option<String>,
    pub visible_to_tiers: Vec<Tier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointFieldAccess {
    pub endpoint: String,
    pub user_tier: Tier,
    pub field_access: BTreeMap<String, FieldAccess>,
    pub result_limit: Option<u32>,
    pub rate_limit: Option<RateLimit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnknownEndpoint {
    pub error: String,
    pub available_endpoints: Vec<String>,
}

/// Catalog lookup result; an unknown endpoint is an answer, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FieldAccessReport {
    Found(EndpointFieldAccess),
    NotFound(UnknownEndpoint),
}

pub fn field_access(registry: &AccessPolicyRegistry, endpoint_id: &str, tier: Tier) -> FieldAccessReport {
    let Some(policy) = registry.policy_for(endpoint_id) else {
        return FieldAccessReport::NotFound(UnknownEndpoint {
            error: format!("No access configuration found for endpoint: {endpoint_id}"),
            available_endpoints: registry.endpoint_ids(),
        });
    };

    let field_access = policy
        .fields()
        .iter()
        .map(|f| {
            let outcome = f.outcome(tier);
            let masked_value = match outcome {
                FieldOutcome::Mask(v) => Some(v.clone()),
                _ => None,
            };
            let access = FieldAccess {
                visible: f.is_visible(tier),
                outcome: outcome.as_str(),
                masked_value,
                description: f.description.clone(),
                visible_to_tiers: f.visible_to.iter().copied().collect(),
            };
            (f.field_name.clone(), access)
        })
        .collect();

    FieldAccessReport::Found(EndpointFieldAccess {
        endpoint: endpoint_id.to_string(),
        user_tier: tier,
        field_access,
        result_limit: policy.max_results(tier),
        rate_limit: policy.rate_limit(tier),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoSamples {
    pub hotel_search: FilteredResponse,
    pub itinerary_optimization: FilteredResponse,
}

/// Fixed sample payloads filtered as a given tier would see them.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub demonstration_tier: Tier,
    pub sample_data: DemoSamples,
    pub explanation: String,
}

/// Preview filtering for a named tier. Unknown names are `InvalidTier`.
pub fn demo(engine: &FilteringEngine, tier_name: &str) -> Result<DemoReport> {
    let tier: Tier = tier_name.parse()?;
    let caller = Caller::for_tier(tier, 999);
    let identity = caller.as_ref().map(|c| c as &dyn Identity);

    Ok(DemoReport {
        demonstration_tier: tier,
        sample_data: DemoSamples {
            hotel_search: engine.filter_for(sample_hotel(), identity, HOTEL_SEARCH),
            itinerary_optimization: engine.filter_for(sample_itinerary(), identity, ITINERARY_OPTIMIZE),
        },
        explanation: format!("This shows how data would appear to a {tier} user"),
    })
}

pub fn sample_hotel() -> Value {
    json!({
        "hotel_id": 123,
        "hotel_name": "Sample Luxury Resort",
        "star_rating": 5,
        "guest_rating": 4.8,
        "available_dates": ["2025-11-01", "2025-11-02", "2025-11-03"],
        "price_range": { "min": 150.0, "max": 300.0 },
        "avg_price": 225.0,
        "total_nights_available": 3,
        "covers_full_range": true,
    })
}

pub fn sample_itinerary() -> Value {
    json!({
        "hotel_id": 123,
        "hotel_name": "Sample Luxury Resort",
        "price": 225.0,
        "selection_reason": "cheapest_available",
        "alternatives_generated": 5,
        "processing_time_ms": 150,
        "request_hash": "abc123def456",
    })
}

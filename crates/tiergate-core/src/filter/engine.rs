use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::policy::{AccessPolicyRegistry, EndpointPolicy, FieldOutcome, LimitMode, PromotionalMessage};
use crate::tier::{classify, Identity, Tier};

use super::monthly;
use super::normalize::{normalize, RawPayload};

/// Tier-appropriate view of one response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredResponse {
    pub data: Value,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionalMessage>,
}

/// Stateless response filter over a shared, immutable registry.
#[derive(Debug, Clone)]
pub struct FilteringEngine {
    registry: Arc<AccessPolicyRegistry>,
}

impl FilteringEngine {
    pub fn new(registry: Arc<AccessPolicyRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AccessPolicyRegistry {
        &self.registry
    }

    /// Classify the caller, then filter.
    pub fn filter_for(
        &self,
        payload: impl Into<RawPayload>,
        identity: Option<&dyn Identity>,
        endpoint_id: &str,
    ) -> FilteredResponse {
        self.filter(payload, classify(identity), endpoint_id)
    }

    /// Normalize, redact fields, cap results, attach promotion; in that order.
    ///
    /// An endpoint without a policy passes through unfiltered.
    pub fn filter(&self, payload: impl Into<RawPayload>, tier: Tier, endpoint_id: &str) -> FilteredResponse {
        let data = normalize(payload.into());

        let Some(policy) = self.registry.policy_for(endpoint_id) else {
            tracing::warn!(endpoint = %endpoint_id, %tier, "no access policy configured; passing response through");
            return FilteredResponse { data, tier, promotion: None };
        };

        let data = filter_fields(data, tier, policy);
        let data = apply_result_limits(data, tier, policy);
        let promotion = self.promotion_for(tier, policy);

        FilteredResponse { data, tier, promotion }
    }

    fn promotion_for(&self, tier: Tier, policy: &EndpointPolicy) -> Option<PromotionalMessage> {
        // paying tiers never see upsell copy, even if flags say otherwise
        if tier.is_paying() {
            return None;
        }
        if !self.registry.exposure_flags(tier).show_promotional_messages {
            return None;
        }
        let family = policy.promo_family()?;
        self.registry.promotional_message(family, tier).cloned()
    }
}

/// Recursively apply field visibility. Only object keys are ever gated.
pub fn filter_fields(value: Value, tier: Tier, policy: &EndpointPolicy) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| filter_fields(item, tier, policy))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                match policy.outcome(&key, tier) {
                    FieldOutcome::Keep => {
                        let value = filter_fields(value, tier, policy);
                        out.insert(key, value);
                    }
                    FieldOutcome::Mask(mask) => {
                        out.insert(key, mask.clone());
                    }
                    FieldOutcome::Omit => {}
                }
            }
            Value::Object(out)
        }
        other => other,
    }
}

/// Apply the tier's result cap.
///
/// Month-grouped itinerary payloads are routed to the reducer before any
/// generic truncation runs; truncating them would silently drop months.
pub fn apply_result_limits(data: Value, tier: Tier, policy: &EndpointPolicy) -> Value {
    let Some(cap) = policy.max_results(tier) else {
        return data;
    };

    if policy.limit_mode() == LimitMode::MonthlyNearest && data.get("normal").is_some_and(is_populated) {
        return monthly::reduce_to_nearest(data, tier, cap);
    }

    let limit = cap as usize;
    match data {
        Value::Array(mut items) => {
            if items.len() > limit {
                tracing::info!(from = items.len(), to = limit, %tier, endpoint = %policy.endpoint_id(), "limited results");
                items.truncate(limit);
            }
            Value::Array(items)
        }
        Value::Object(mut map) => {
            let total = match map.get_mut("results") {
                Some(Value::Array(results)) if results.len() > limit => {
                    let total = results.len();
                    results.truncate(limit);
                    Some(total)
                }
                _ => None,
            };
            if let Some(total) = total {
                tracing::info!(from = total, to = limit, %tier, endpoint = %policy.endpoint_id(), "limited results");
                map.insert("total_available".into(), Value::from(total));
                map.insert("showing".into(), Value::from(limit));
                map.insert("limited_by_tier".into(), Value::Bool(true));
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Truthiness of a JSON value: null, false, 0, "" and empty containers are empty.
fn is_populated(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

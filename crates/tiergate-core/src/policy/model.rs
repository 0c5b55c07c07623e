use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;

use crate::tier::Tier;

use super::schema::{EndpointConfig, FieldConfig, LimitMode, RateLimit};

/// What happens to one field for one tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldOutcome<'a> {
    /// Emit the real value (recursing into containers).
    Keep,
    /// Emit this replacement instead of the real value.
    Mask(&'a Value),
    /// Drop the key.
    Omit,
}

impl FieldOutcome<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOutcome::Keep => "visible",
            FieldOutcome::Mask(_) => "masked",
            FieldOutcome::Omit => "omitted",
        }
    }
}

/// Compiled visibility rule for one output field.
#[derive(Debug, Clone)]
pub struct FieldPolicy {
    pub field_name: String,
    pub visible_to: BTreeSet<Tier>,
    pub masked_value: Option<Value>,
    pub description: Option<String>,
}

impl FieldPolicy {
    pub fn is_visible(&self, tier: Tier) -> bool {
        self.visible_to.contains(&tier)
    }

    pub fn outcome(&self, tier: Tier) -> FieldOutcome<'_> {
        if self.is_visible(tier) {
            return FieldOutcome::Keep;
        }
        match &self.masked_value {
            Some(mask) => FieldOutcome::Mask(mask),
            None => FieldOutcome::Omit,
        }
    }
}

impl From<&FieldConfig> for FieldPolicy {
    fn from(f: &FieldConfig) -> Self {
        Self {
            field_name: f.field.clone(),
            visible_to: f.visible_to.iter().copied().collect(),
            masked_value: f.masked_value.clone(),
            description: f.description.clone(),
        }
    }
}

/// Compiled policy for one gated endpoint.
/// Construct once at startup, then share via the registry.
#[derive(Debug, Clone)]
pub struct EndpointPolicy {
    endpoint_id: String,
    fields: Vec<FieldPolicy>,
    by_name: HashMap<String, usize>,
    max_results: BTreeMap<Tier, u32>,
    rate_limits: BTreeMap<Tier, RateLimit>,
    promo_family: Option<String>,
    limit_mode: LimitMode,
}

impl EndpointPolicy {
    /// Expects a validated config (unique field names).
    pub fn new(cfg: &EndpointConfig) -> Self {
        let fields: Vec<FieldPolicy> = cfg.fields.iter().map(FieldPolicy::from).collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.field_name.clone(), i))
            .collect();
        let max_results = cfg
            .max_results
            .iter()
            .filter_map(|(tier, cap)| cap.map(|c| (*tier, c)))
            .collect();

        Self {
            endpoint_id: cfg.endpoint.clone(),
            fields,
            by_name,
            max_results,
            rate_limits: cfg.rate_limits.clone(),
            promo_family: cfg.promo_family.clone(),
            limit_mode: cfg.limit_mode,
        }
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    /// Field policies in configuration order.
    pub fn fields(&self) -> &[FieldPolicy] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldPolicy> {
        self.by_name.get(name).and_then(|i| self.fields.get(*i))
    }

    /// Unconfigured fields stay visible.
    pub fn outcome(&self, field_name: &str, tier: Tier) -> FieldOutcome<'_> {
        match self.field(field_name) {
            Some(f) => f.outcome(tier),
            None => FieldOutcome::Keep,
        }
    }

    /// `None` means unlimited.
    pub fn max_results(&self, tier: Tier) -> Option<u32> {
        self.max_results.get(&tier).copied()
    }

    pub fn rate_limit(&self, tier: Tier) -> Option<RateLimit> {
        self.rate_limits.get(&tier).copied()
    }

    pub fn promo_family(&self) -> Option<&str> {
        self.promo_family.as_deref()
    }

    pub fn limit_mode(&self) -> LimitMode {
        self.limit_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(visible_to: &[Tier], masked_value: Option<Value>) -> FieldPolicy {
        FieldPolicy {
            field_name: "f".into(),
            visible_to: visible_to.iter().copied().collect(),
            masked_value,
            description: None,
        }
    }

    #[test]
    fn outcome_is_three_way() {
        let omitted = field(&[Tier::Premium, Tier::Admin], None);
        assert_eq!(omitted.outcome(Tier::Anonymous), FieldOutcome::Omit);
        assert_eq!(omitted.outcome(Tier::Premium), FieldOutcome::Keep);

        let null_mask = json!(null);
        let masked = field(&[Tier::Admin], Some(null_mask.clone()));
        assert_eq!(masked.outcome(Tier::Premium), FieldOutcome::Mask(&null_mask));

        let empty = json!([]);
        let masked_empty = field(&[Tier::Admin], Some(empty.clone()));
        assert_eq!(masked_empty.outcome(Tier::Anonymous), FieldOutcome::Mask(&empty));
    }
}

//! End-to-end filtering vectors (field redaction, caps, reducer, promotions).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use tiergate_core::{AccessPolicyRegistry, FilteringEngine, Tier};

use vector_loader::load;

#[test]
fn filter_vectors() {
    let registry = Arc::new(AccessPolicyRegistry::builtin().expect("builtin policies"));
    let engine = FilteringEngine::new(Arc::clone(&registry));

    let files = [
        "hotel_anonymous.json",
        "hotel_premium.json",
        "hotel_anonymous_results_capped.json",
        "hotel_authenticated_results.json",
        "itinerary_anonymous_monthly.json",
        "itinerary_first_populated_month.json",
        "itinerary_anonymous_no_valid_option.json",
        "itinerary_authenticated_monthly.json",
        "itinerary_admin.json",
        "unknown_endpoint.json",
    ];

    for f in files {
        let v = load(f);
        let tier: Tier = v.tier.parse().expect("vector tier");

        let out = engine.filter(v.input, tier, &v.endpoint);

        assert_eq!(out.tier, tier, "vector={}", v.description);
        assert_eq!(out.data, v.expect, "vector={}", v.description);

        let expected_promo = v
            .expect_promotion_family
            .as_deref()
            .and_then(|family| registry.promotional_message(family, tier))
            .cloned();
        if v.expect_promotion_family.is_some() {
            assert!(expected_promo.is_some(), "vector={} names a missing promotion", v.description);
        }
        assert_eq!(out.promotion, expected_promo, "vector={}", v.description);
    }
}

#[test]
fn filtered_response_wire_shape() {
    let registry = Arc::new(AccessPolicyRegistry::builtin().unwrap());
    let engine = FilteringEngine::new(registry);
    let v = load("hotel_anonymous.json");

    let out = engine.filter(v.input.clone(), Tier::Anonymous, &v.endpoint);
    let wire = serde_json::to_value(&out).unwrap();
    assert_eq!(wire["tier"], "anonymous");
    assert_eq!(wire["promotion"]["cta"], "Sign up for free");
    assert_eq!(wire["data"]["hotel_name"], "X");

    let out = engine.filter(v.input, Tier::Premium, &v.endpoint);
    let wire = serde_json::to_value(&out).unwrap();
    assert_eq!(wire["tier"], "premium");
    assert!(wire.get("promotion").is_none());
}

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use tiergate_core::introspect::sample_hotel;
use tiergate_core::policy::HOTEL_SEARCH;
use tiergate_gateway::app_state::AppState;
use tiergate_gateway::context::CurrentCaller;
use tiergate_gateway::filter_layer::filtered_json;
use tiergate_gateway::{config, router, sample};

const CONFIG: &str = r#"
version: 1
callers:
  - { token: "user-token", user_id: 7 }
  - { token: "premium-token", user_id: 8, premium: true }
  - { token: "admin-token", user_id: 1, superuser: true }
"#;

fn state(yaml: &str) -> AppState {
    AppState::new(config::load_from_str(yaml).unwrap()).unwrap()
}

fn app() -> Router {
    router::build_router(state(CONFIG), sample::routes())
}

async fn get_as(app: Router, uri: &str, token: Option<&str>) -> Response {
    let mut req = Request::builder().uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let resp = get_as(app(), "/healthz", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_reflects_bearer_token() {
    let body = json_body(get_as(app(), "/api/v1/access/me", Some("admin-token")).await).await;
    assert_eq!(body["user_tier"], "admin");
    assert_eq!(body["user_info"]["user_id"], 1);
    assert_eq!(body["permissions"]["show_debug_info"], true);

    let body = json_body(get_as(app(), "/api/v1/access/me", Some("no-such-token")).await).await;
    assert_eq!(body["user_tier"], "anonymous");
    assert_eq!(body["user_info"]["is_authenticated"], false);
    assert!(body["promotional_messages"]["hotel_search_anonymous"].is_object());
}

#[tokio::test]
async fn tiers_lists_catalog() {
    let body = json_body(get_as(app(), "/api/v1/access/tiers", None).await).await;
    for t in ["anonymous", "authenticated", "premium", "admin"] {
        assert!(body["access_tiers"][t]["description"].is_string(), "tier={t}");
        assert!(body["upgrade_path"][t].is_string(), "tier={t}");
    }
    assert_eq!(body["access_tiers"]["anonymous"]["endpoint_limits"]["/hotels/search"], 5);
}

#[tokio::test]
async fn field_access_uses_caller_tier() {
    let body = json_body(get_as(app(), "/api/v1/access/field-access/hotels/search", None).await).await;
    assert_eq!(body["endpoint"], "/hotels/search");
    assert_eq!(body["field_access"]["hotel_id"]["outcome"], "omitted");
    assert_eq!(body["field_access"]["guest_rating"]["masked_value"], "Login to see ratings");

    let body = json_body(
        get_as(app(), "/api/v1/access/field-access/api/v1/hotels/search", Some("premium-token")).await,
    )
    .await;
    assert_eq!(body["user_tier"], "premium");
    assert_eq!(body["field_access"]["hotel_id"]["visible"], true);
    assert_eq!(body["result_limit"], Value::Null);
}

#[tokio::test]
async fn field_access_unknown_endpoint_is_404() {
    let resp = get_as(app(), "/api/v1/access/field-access/bookings/list", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["available_endpoints"], serde_json::json!(["/hotels/search", "/itineraries/optimize"]));
}

#[tokio::test]
async fn demo_admin_hides_nothing() {
    let resp = get_as(app(), "/api/v1/access/demo/Admin", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["demonstration_tier"], "admin");
    assert_eq!(body["sample_data"]["hotel_search"]["data"], sample_hotel());
    assert!(body["sample_data"]["hotel_search"].get("promotion").is_none());
    assert!(body["sample_data"]["itinerary_optimization"].get("promotion").is_none());
}

#[tokio::test]
async fn demo_invalid_tier_lists_valid_tiers() {
    let resp = get_as(app(), "/api/v1/access/demo/platinum", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "INVALID_TIER");
    assert_eq!(
        body["valid_tiers"],
        serde_json::json!(["anonymous", "authenticated", "premium", "admin"])
    );
}

#[tokio::test]
async fn middleware_filters_upstream_for_anonymous() {
    let resp = get_as(app(), "/api/v1/hotels/search", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;

    assert_eq!(body["tier"], "anonymous");
    assert_eq!(body["promotion"]["cta"], "Sign up for free");
    let data = &body["data"];
    assert_eq!(data["results"].as_array().map(Vec::len), Some(5));
    assert_eq!(data["total_available"], 8);
    assert_eq!(data["limited_by_tier"], true);
    assert!(data["results"][0].get("hotel_id").is_none());
    assert_eq!(data["results"][0]["avg_price"], "Login for pricing");
}

#[tokio::test]
async fn middleware_passes_premium_view_verbatim() {
    let body = json_body(get_as(app(), "/api/v1/hotels/search", Some("premium-token")).await).await;
    assert_eq!(body["tier"], "premium");
    assert!(body.get("promotion").is_none());
    assert_eq!(body["data"]["results"].as_array().map(Vec::len), Some(8));
    assert_eq!(body["data"]["results"][0]["hotel_id"], 101);
}

#[tokio::test]
async fn middleware_reduces_itinerary_months_for_anonymous() {
    let body = json_body(get_as(app(), "/api/v1/itineraries/optimize", None).await).await;
    let data = &body["data"];
    assert_eq!(data["best_itinerary"]["label"], "Early November");
    assert_eq!(
        data["access_message"],
        "Showing nearest option (Early November). Login to see all 4 timing options across available months."
    );
    assert!(data.get("hotel_id").is_none());
    assert_eq!(data["price"], "Login for pricing");
}

#[tokio::test]
async fn unconfigured_and_non_json_responses_pass_through() {
    let upstream = Router::new()
        .route("/api/v1/bookings/list", get(|| async { axum::Json(serde_json::json!({ "hotel_id": 3 })) }))
        .route("/api/v1/itineraries/optimize", get(|| async { "plain text" }));
    let app = router::build_router(state(CONFIG), upstream);

    let body = json_body(get_as(app.clone(), "/api/v1/bookings/list", None).await).await;
    assert_eq!(body, serde_json::json!({ "hotel_id": 3 }));

    let resp = get_as(app, "/api/v1/itineraries/optimize", None).await;
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"plain text");
}

#[tokio::test]
async fn explicitly_filtered_handlers_are_not_filtered_twice() {
    let upstream = Router::new().route(
        "/api/v1/hotels/search",
        get(|axum::extract::State(s): axum::extract::State<AppState>, caller: CurrentCaller| async move {
            filtered_json(&s, &caller, HOTEL_SEARCH, sample_hotel())
        }),
    );
    let app = router::build_router(state(CONFIG), upstream);

    let body = json_body(get_as(app, "/api/v1/hotels/search", Some("user-token")).await).await;
    assert_eq!(body["tier"], "authenticated");
    assert_eq!(body["data"]["hotel_id"], 123);
    assert!(body["data"].get("data").is_none());
}

#[tokio::test]
async fn anonymous_budget_exhaustion_is_429() {
    let app = app();
    // built-in anonymous hotel search budget: 10 per hour
    for i in 0..10 {
        let resp = get_as(app.clone(), "/api/v1/hotels/search", None).await;
        assert_eq!(resp.status(), StatusCode::OK, "request {i}");
    }
    let resp = get_as(app.clone(), "/api/v1/hotels/search", None).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().get(header::RETRY_AFTER).is_some());
    assert_eq!(json_body(resp).await["code"], "RATE_LIMITED");

    // a different caller has its own bucket
    let resp = get_as(app, "/api/v1/hotels/search", Some("user-token")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn rate_limiting_can_be_disabled() {
    let yaml = "version: 1\ngateway:\n  rate_limiting: false\n";
    let app = router::build_router(state(yaml), sample::routes());
    for _ in 0..15 {
        let resp = get_as(app.clone(), "/api/v1/hotels/search", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn oversized_upstream_body_is_returned_unfiltered() {
    let hotels: Vec<Value> = (0..200)
        .map(|i| serde_json::json!({ "hotel_id": i, "hotel_name": format!("Hotel {i}"), "avg_price": 120.0 }))
        .collect();
    let payload = serde_json::json!({ "results": hotels });
    let served = payload.clone();
    let upstream = Router::new().route(
        "/api/v1/hotels/search",
        get(move || {
            let body = served.clone();
            async move { axum::Json(body) }
        }),
    );
    let app = router::build_router(state("version: 1\ngateway:\n  max_body_bytes: 1024\n"), upstream);

    let resp = get_as(app, "/api/v1/hotels/search", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body, payload);
    assert!(body.get("tier").is_none());
}

//! Stand-in upstream travel API serving fixed sample payloads.
//!
//! The binary mounts these behind the filtering middleware so the whole
//! pipeline can be exercised without a real hotel/itinerary backend.

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use tiergate_core::introspect::{sample_hotel, sample_itinerary};
use tiergate_core::policy::HOTEL_SEARCH;

use crate::app_state::AppState;
use crate::context::CurrentCaller;
use crate::filter_layer::filtered_json;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/hotels/search", get(hotel_search))
        .route("/api/v1/hotels/featured", get(featured_hotel))
        .route("/api/v1/itineraries/optimize", get(itinerary_optimize))
}

pub async fn hotel_search() -> Json<Value> {
    let results: Vec<Value> = (1..=8)
        .map(|i| {
            let mut h = sample_hotel();
            h["hotel_id"] = json!(100 + i);
            h["hotel_name"] = json!(format!("Sample Resort #{i}"));
            h
        })
        .collect();
    Json(json!({ "results": results, "query": { "city": "Goa", "nights": 3 } }))
}

/// Filters in the handler rather than relying on the middleware.
pub async fn featured_hotel(State(state): State<AppState>, caller: CurrentCaller) -> Response {
    filtered_json(&state, &caller, HOTEL_SEARCH, sample_hotel())
}

pub async fn itinerary_optimize() -> Json<Value> {
    let mut body = sample_itinerary();
    body["normal"] = json!({
        "monthly_options": [
            {
                "month": "November",
                "start_month": { "label": "Early November", "start_date": "2025-11-03", "total_cost": 675.0 },
                "mid_month": { "label": "Mid November", "start_date": "2025-11-14", "total_cost": 640.0 },
                "end_month": null
            },
            {
                "month": "December",
                "start_month": null,
                "mid_month": { "label": "Mid December", "start_date": "2025-12-12", "total_cost": 820.0 },
                "end_month": { "label": "Late December", "start_date": "2025-12-27", "total_cost": 910.0 }
            }
        ]
    });
    Json(body)
}

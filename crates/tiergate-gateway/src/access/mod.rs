//! Access introspection routes (`/api/v1/access/...`).
//!
//! Read-only views over the compiled policy set: what the current caller can
//! see, the tier catalog, per-field access for an endpoint, and a demo of the
//! filtered sample payloads for any tier.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use tiergate_core::introspect::{self, AccessSummary, DemoReport, FieldAccessReport, TierCatalog};
use tiergate_core::path::normalize_endpoint_path;

use crate::app_state::AppState;
use crate::context::CurrentCaller;
use crate::error::ApiError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/tiers", get(tiers))
        .route("/field-access/*endpoint", get(field_access))
        .route("/demo/:tier", get(demo))
}

pub async fn me(State(state): State<AppState>, caller: CurrentCaller) -> Json<AccessSummary> {
    Json(introspect::access_summary(state.registry(), caller.identity()))
}

pub async fn tiers(State(state): State<AppState>) -> Json<TierCatalog> {
    Json(introspect::tier_catalog(state.registry()))
}

pub async fn field_access(
    State(state): State<AppState>,
    caller: CurrentCaller,
    Path(endpoint): Path<String>,
) -> Response {
    let endpoint_id = normalize_endpoint_path(&format!("/{endpoint}"));
    match introspect::field_access(state.registry(), &endpoint_id, caller.tier()) {
        report @ FieldAccessReport::Found(_) => Json(report).into_response(),
        report @ FieldAccessReport::NotFound(_) => (StatusCode::NOT_FOUND, Json(report)).into_response(),
    }
}

pub async fn demo(State(state): State<AppState>, Path(tier): Path<String>) -> Result<Json<DemoReport>, ApiError> {
    Ok(Json(introspect::demo(state.engine(), &tier)?))
}

//! Axum router wiring.
//!
//! Introspection and ops routes are served as-is; `upstream` routes sit
//! behind the response-filtering middleware.

use axum::{middleware, routing::get, Router};

use crate::{access, app_state::AppState, filter_layer, ops};

pub fn build_router(state: AppState, upstream: Router<AppState>) -> Router {
    let filtered = upstream.layer(middleware::from_fn_with_state(
        state.clone(),
        filter_layer::filter_responses,
    ));

    Router::new()
        .route("/healthz", get(ops::healthz))
        .nest("/api/v1/access", access::routes())
        .merge(filtered)
        .with_state(state)
}

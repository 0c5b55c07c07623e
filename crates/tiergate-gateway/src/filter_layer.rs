//! Response-filtering middleware.
//!
//! Wraps upstream routes: every JSON response from an endpoint with an access
//! policy is rewritten into the caller's tier view (`{data, tier, promotion?}`).
//! Filtering never breaks a response; on any failure the original body is
//! returned unchanged and the failure is logged.

use axum::body::{self, Body, HttpBody};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;

use tiergate_core::path::normalize_endpoint_path;
use tiergate_core::{RawPayload, TierGateError};

use crate::app_state::AppState;
use crate::context::CurrentCaller;
use crate::error::ApiError;

/// Response extension marking a body that is already a filtered view.
#[derive(Debug, Clone, Copy)]
pub struct AlreadyFiltered;

pub async fn filter_responses(
    State(state): State<AppState>,
    caller: CurrentCaller,
    req: Request,
    next: Next,
) -> Response {
    let endpoint = normalize_endpoint_path(req.uri().path());
    let Some(policy) = state.registry().policy_for(&endpoint) else {
        return next.run(req).await;
    };
    let tier = caller.tier();

    if let Err(retry_after_secs) = state.limiter().check(&caller.key, &endpoint, policy.rate_limit(tier)) {
        tracing::warn!(%endpoint, %tier, key = %caller.key, retry_after_secs, "rate limited");
        return ApiError(TierGateError::RateLimited { retry_after_secs }).into_response();
    }

    let resp = next.run(req).await;
    if resp.extensions().get::<AlreadyFiltered>().is_some() || !is_json(resp.headers()) {
        return resp;
    }

    let max_body_bytes = state.cfg().gateway.max_body_bytes;
    if exceeds_limit(&resp, max_body_bytes) {
        tracing::warn!(%endpoint, %tier, max_body_bytes, "upstream body over limit; returning it unfiltered");
        return resp;
    }

    let (mut parts, body) = resp.into_parts();
    let raw: Bytes = match body::to_bytes(body, max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            // only reachable for streams with no declared size; the stream is consumed
            tracing::error!(%endpoint, error = %e, "failed to buffer upstream body");
            return ApiError(TierGateError::Internal("upstream body unavailable".into())).into_response();
        }
    };

    match filter_body(&state, &raw, &caller, &endpoint) {
        Ok(filtered) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(filtered))
        }
        Err(e) => {
            tracing::error!(%endpoint, %tier, error = %e, "response filtering failed; returning original body");
            Response::from_parts(parts, Body::from(raw))
        }
    }
}

fn filter_body(state: &AppState, raw: &[u8], caller: &CurrentCaller, endpoint: &str) -> serde_json::Result<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    let filtered = state.engine().filter_for(value, caller.identity(), endpoint);
    serde_json::to_vec(&filtered)
}

/// Size check before buffering: `Content-Length` when present, else the
/// body's size hint. A stream of unknown size is buffered and bounded there.
fn exceeds_limit(resp: &Response, limit: usize) -> bool {
    let limit = limit as u64;
    let declared = resp
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let hint = resp.body().size_hint();
    match declared.or(hint.upper()) {
        Some(len) => len > limit,
        None => hint.lower() > limit,
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"))
}

/// Filter explicitly inside a handler. The response is marked so the
/// middleware does not filter it a second time.
pub fn filtered_json(state: &AppState, caller: &CurrentCaller, endpoint: &str, data: impl Into<RawPayload>) -> Response {
    let endpoint = normalize_endpoint_path(endpoint);
    let filtered = state.engine().filter_for(data, caller.identity(), &endpoint);
    let mut resp = Json(filtered).into_response();
    resp.extensions_mut().insert(AlreadyFiltered);
    resp
}

//! HTTP rendering of core errors.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tiergate_core::TierGateError;

/// `TierGateError` as an HTTP response: `{ "error", "code", "valid_tiers"? }`.
#[derive(Debug)]
pub struct ApiError(pub TierGateError);

impl From<TierGateError> for ApiError {
    fn from(e: TierGateError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid_tiers: Option<Vec<&'static str>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorBody {
            error: self.0.to_string(),
            code: code.as_str(),
            valid_tiers: self.0.valid_tiers(),
        };
        let mut resp = (status, Json(body)).into_response();

        if let TierGateError::RateLimited { retry_after_secs } = self.0 {
            let secs = retry_after_secs.max(1);
            if let Ok(v) = HeaderValue::from_str(&secs.to_string()) {
                resp.headers_mut().insert(header::RETRY_AFTER, v);
            }
        }
        resp
    }
}

//! Shared error type across tierGate crates.

use thiserror::Error;

use crate::tier::Tier;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Tier name is not one of the known tiers.
    InvalidTier,
    /// Requested catalog entry does not exist.
    NotFound,
    /// Rate limited.
    RateLimited,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidTier => "INVALID_TIER",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status the gateway answers with.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::BadRequest | ClientCode::InvalidTier | ClientCode::UnsupportedVersion => 400,
            ClientCode::NotFound => 404,
            ClientCode::RateLimited => 429,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TierGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum TierGateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid tier: {0}")]
    InvalidTier(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl TierGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TierGateError::BadRequest(_) => ClientCode::BadRequest,
            TierGateError::InvalidTier(_) => ClientCode::InvalidTier,
            TierGateError::NotFound(_) => ClientCode::NotFound,
            TierGateError::RateLimited { .. } => ClientCode::RateLimited,
            TierGateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            TierGateError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Tier names a client may use instead, for invalid-tier errors.
    pub fn valid_tiers(&self) -> Option<Vec<&'static str>> {
        match self {
            TierGateError::InvalidTier(_) => Some(Tier::ALL.iter().map(|t| t.as_str()).collect()),
            _ => None,
        }
    }
}

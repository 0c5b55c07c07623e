//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use tiergate_core::error::{Result, TierGateError};

pub use schema::{CallerConfig, GatewayConfig, GatewaySection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TIERGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "tiergate.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TierGateError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| TierGateError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Like `load_from_file`, but a missing file yields the default config
/// (built-in policies, no callers). Any other read error still fails.
pub fn load_or_default(path: &str) -> Result<GatewayConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(%path, "config file not found; using built-in defaults");
            Ok(GatewayConfig::default())
        }
        Err(e) => Err(TierGateError::Internal(format!("read config failed: {e}"))),
    }
}

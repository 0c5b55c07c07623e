use std::collections::HashSet;

use serde::Deserialize;
use tiergate_core::error::{Result, TierGateError};
use tiergate_core::policy::AccessConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    /// Static bearer-token table standing in for a real identity provider.
    #[serde(default)]
    pub callers: Vec<CallerConfig>,

    /// Policy set override; the built-in `policies.yaml` when absent.
    #[serde(default)]
    pub access: Option<AccessConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            callers: Vec::new(),
            access: None,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TierGateError::UnsupportedVersion);
        }

        self.gateway.validate()?;

        let mut tokens = HashSet::new();
        for c in &self.callers {
            if c.token.trim().is_empty() {
                return Err(TierGateError::BadRequest("callers[].token must not be empty".into()));
            }
            if !tokens.insert(c.token.as_str()) {
                return Err(TierGateError::BadRequest(format!(
                    "duplicate caller token (user_id={:?})",
                    c.user_id
                )));
            }
        }

        if let Some(access) = &self.access {
            access.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound on a buffered upstream body the middleware will filter.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_rate_limiting")]
    pub rate_limiting: bool,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
            rate_limiting: default_rate_limiting(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(TierGateError::BadRequest(
                "gateway.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}
fn default_rate_limiting() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallerConfig {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub superuser: bool,
    #[serde(default)]
    pub premium: bool,
}

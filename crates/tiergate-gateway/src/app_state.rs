//! Shared application state for the tierGate gateway.
//!
//! Compiles the policy set once at startup; everything request handlers touch
//! afterwards is immutable except the rate-limit buckets.

use std::collections::HashMap;
use std::sync::Arc;

use tiergate_core::error::{Result, TierGateError};
use tiergate_core::{AccessPolicyRegistry, Caller, FilteringEngine};

use crate::config::GatewayConfig;
use crate::ratelimit::TierRateLimiter;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    engine: FilteringEngine,
    limiter: Arc<TierRateLimiter>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    callers: HashMap<String, Caller>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report a bad policy set instead of panicking.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let registry = match &cfg.access {
            Some(access) => AccessPolicyRegistry::from_config(access),
            None => AccessPolicyRegistry::builtin(),
        }
        .map_err(|e| TierGateError::BadRequest(format!("access policy compile failed: {e}")))?;

        tracing::info!(
            endpoints = ?registry.endpoint_ids(),
            callers = cfg.callers.len(),
            "access policies loaded"
        );

        let callers = cfg
            .callers
            .iter()
            .map(|c| {
                let caller = Caller {
                    user_id: c.user_id,
                    is_superuser: c.superuser,
                    is_premium: c.premium,
                };
                (c.token.clone(), caller)
            })
            .collect();

        let limiter = TierRateLimiter::new(cfg.gateway.rate_limiting);

        Ok(Self {
            engine: FilteringEngine::new(Arc::new(registry)),
            limiter: Arc::new(limiter),
            inner: Arc::new(AppStateInner { cfg, callers }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &AccessPolicyRegistry {
        self.engine.registry()
    }

    pub fn engine(&self) -> &FilteringEngine {
        &self.engine
    }

    pub fn limiter(&self) -> &TierRateLimiter {
        &self.limiter
    }

    /// Bearer token -> caller. Unknown tokens resolve to nobody (anonymous).
    pub fn resolve_caller(&self, token: &str) -> Option<Caller> {
        self.inner.callers.get(token).cloned()
    }
}

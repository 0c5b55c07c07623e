//! Per-tier request budgets (token bucket per caller and endpoint).
//!
//! Budgets come from the endpoint policy (`rate_limits`): `requests` tokens
//! refilled evenly over `per_minutes`. Rejections carry a Retry-After hint.
//! Buckets live in memory only; a restart forgets them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use tiergate_core::policy::RateLimit;

/// Buckets kept before idle (full) ones are swept.
const MAX_BUCKETS: usize = 100_000;
/// Minimum gap between two sweeps, however large the map stays.
const SWEEP_INTERVAL_MS: u64 = 10_000;

/// Token bucket (capacity/refill, best-effort).
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last: Instant,
}

impl TokenBucket {
    pub fn new(limit: RateLimit) -> Self {
        let cap = limit.requests.max(1) as f64;
        let window_secs = (limit.per_minutes.max(1) as f64) * 60.0;
        Self {
            capacity: cap,
            tokens: cap,
            refill_per_sec: cap / window_secs,
            last: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
    }

    /// Take one token. Err carries retry-after seconds (ceil, min 1).
    pub fn try_take(&mut self) -> Result<(), u64> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let wait = ((1.0 - self.tokens) / self.refill_per_sec).ceil();
            Err(wait.max(1.0) as u64)
        }
    }

    fn is_idle(&mut self) -> bool {
        self.refill();
        self.tokens >= self.capacity
    }
}

/// In-memory limiter keyed by (caller key, endpoint id).
#[derive(Debug)]
pub struct TierRateLimiter {
    enabled: bool,
    max_buckets: usize,
    buckets: DashMap<(String, String), TokenBucket>,
    started: Instant,
    /// Milliseconds since `started` before which no sweep may run.
    next_sweep_ms: AtomicU64,
    sweeps: AtomicU64,
}

impl TierRateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self::with_max_buckets(enabled, MAX_BUCKETS)
    }

    fn with_max_buckets(enabled: bool, max_buckets: usize) -> Self {
        Self {
            enabled,
            max_buckets,
            buckets: DashMap::new(),
            started: Instant::now(),
            next_sweep_ms: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Charge one request. `None` limit means the tier is unmetered here.
    pub fn check(&self, caller_key: &str, endpoint_id: &str, limit: Option<RateLimit>) -> Result<(), u64> {
        let Some(limit) = limit else {
            return Ok(());
        };
        if !self.enabled {
            return Ok(());
        }

        let result = {
            let mut bucket = self
                .buckets
                .entry((caller_key.to_string(), endpoint_id.to_string()))
                .or_insert_with(|| TokenBucket::new(limit));
            bucket.try_take()
        };

        if self.buckets.len() > self.max_buckets {
            self.maybe_sweep();
        }

        result
    }

    /// Drop idle buckets, at most once per `SWEEP_INTERVAL_MS`; only the
    /// caller that claims the slot pays for the scan.
    fn maybe_sweep(&self) {
        let now_ms = self.started.elapsed().as_millis() as u64;
        let due = self.next_sweep_ms.load(Ordering::Relaxed);
        if now_ms < due {
            return;
        }
        if self
            .next_sweep_ms
            .compare_exchange(due, now_ms + SWEEP_INTERVAL_MS, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        self.buckets.retain(|_, b| !b.is_idle());
        let sweeps = self.sweeps.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(len = self.buckets.len(), sweeps, "rate limit buckets swept");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bucket_rejects_after_budget() {
        let mut b = TokenBucket::new(RateLimit { requests: 2, per_minutes: 1 });
        assert!(b.try_take().is_ok());
        assert!(b.try_take().is_ok());
        let retry = b.try_take().unwrap_err();
        assert!((1..=30).contains(&retry), "retry={retry}");
    }

    #[test]
    fn limiter_scopes_by_caller_and_endpoint() {
        let l = TierRateLimiter::new(true);
        let one = Some(RateLimit { requests: 1, per_minutes: 60 });
        assert!(l.check("ip:1.1.1.1", "/hotels/search", one).is_ok());
        assert!(l.check("ip:1.1.1.1", "/hotels/search", one).is_err());
        assert!(l.check("ip:1.1.1.1", "/itineraries/optimize", one).is_ok());
        assert!(l.check("ip:2.2.2.2", "/hotels/search", one).is_ok());
    }

    #[test]
    fn sweep_runs_at_most_once_per_interval() {
        let l = TierRateLimiter::with_max_buckets(true, 1);
        let one = Some(RateLimit { requests: 1, per_minutes: 60 });

        assert!(l.check("ip:1", "/x", one).is_ok());
        assert_eq!(l.sweeps.load(Ordering::Relaxed), 0);

        // over the bound: first overflow sweeps, nothing is idle so nothing goes
        assert!(l.check("ip:2", "/x", one).is_ok());
        assert_eq!(l.sweeps.load(Ordering::Relaxed), 1);
        assert_eq!(l.buckets.len(), 2);

        for i in 3..50 {
            assert!(l.check(&format!("ip:{i}"), "/x", one).is_ok());
        }
        assert_eq!(l.sweeps.load(Ordering::Relaxed), 1);
        assert_eq!(l.buckets.len(), 49);
    }

    #[test]
    fn disabled_or_unmetered_always_passes() {
        let one = Some(RateLimit { requests: 1, per_minutes: 60 });
        let off = TierRateLimiter::new(false);
        for _ in 0..5 {
            assert!(off.check("k", "/x", one).is_ok());
        }
        let on = TierRateLimiter::new(true);
        for _ in 0..5 {
            assert!(on.check("k", "/x", None).is_ok());
        }
    }
}

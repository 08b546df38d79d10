//! Login rate limiting, keyed by client identifier.
//!
//! Shared stores (Redis and friends) plug in through [`RateLimiter`]; the
//! in-memory sliding window here covers single-instance deployments.

use async_trait::async_trait;
use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, PoisonError},
};

use crate::auth::now_ms;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_WINDOW_MS: i64 = 60 * 1000;

// Sweep idle identifiers once the map grows past this.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub remaining: u32,
    /// Unix milliseconds at which a new attempt is guaranteed a slot.
    pub reset_at_ms: i64,
}

impl RateLimitOutcome {
    /// Whole seconds until reset, rounded up and never negative.
    #[must_use]
    pub fn retry_after_seconds(&self, now_ms: i64) -> i64 {
        let remaining_ms = self.reset_at_ms.saturating_sub(now_ms).max(0);
        (remaining_ms + 999) / 1000
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record one attempt for `identifier` and decide whether it may proceed.
    async fn check(&self, identifier: &str) -> RateLimitOutcome;
}

/// Allows everything; used when limiting is switched off.
#[derive(Clone, Debug)]
pub struct NoopRateLimiter {
    limit: u32,
    window_ms: i64,
}

impl NoopRateLimiter {
    #[must_use]
    pub const fn new(limit: u32, window_ms: i64) -> Self {
        Self { limit, window_ms }
    }
}

impl Default for NoopRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS)
    }
}

#[async_trait]
impl RateLimiter for NoopRateLimiter {
    async fn check(&self, _identifier: &str) -> RateLimitOutcome {
        RateLimitOutcome {
            allowed: true,
            remaining: self.limit,
            reset_at_ms: now_ms().saturating_add(self.window_ms),
        }
    }
}

/// Sliding log of attempt timestamps per identifier.
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    max_attempts: u32,
    window_ms: i64,
    attempts: Mutex<HashMap<String, VecDeque<i64>>>,
}

impl SlidingWindowRateLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window_ms: i64) -> Self {
        Self {
            max_attempts,
            window_ms,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Clock-explicit form of [`RateLimiter::check`].
    pub fn check_at(&self, identifier: &str, now_ms: i64) -> RateLimitOutcome {
        let window_start = now_ms.saturating_sub(self.window_ms);
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if attempts.len() > PRUNE_THRESHOLD {
            attempts.retain(|_, log| log.back().is_some_and(|&last| last > window_start));
        }

        let log = attempts.entry(identifier.to_string()).or_default();
        while log.front().is_some_and(|&oldest| oldest <= window_start) {
            log.pop_front();
        }

        let used = u32::try_from(log.len()).unwrap_or(u32::MAX);
        let allowed = used < self.max_attempts;
        if allowed {
            log.push_back(now_ms);
        }

        let used = u32::try_from(log.len()).unwrap_or(u32::MAX);
        let reset_at_ms = log
            .front()
            .map_or(now_ms, |&oldest| oldest)
            .saturating_add(self.window_ms);

        RateLimitOutcome {
            allowed,
            remaining: self.max_attempts.saturating_sub(used),
            reset_at_ms,
        }
    }
}

impl Default for SlidingWindowRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS)
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn check(&self, identifier: &str) -> RateLimitOutcome {
        self.check_at(identifier, now_ms())
    }
}

//! Rate limit configuration and decision types.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;

pub const CHAT_OPERATION: &str = "chat";
pub const INSIGHTS_OPERATION: &str = "insights";
pub const DEFAULT_OPERATION: &str = "default";

/// Window length and request budget for one operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimitConfig {
    pub const fn per_minute(max_requests: u32) -> Self {
        RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests,
        }
    }
}

/// Per-class limits. Classes without an entry use the `default` limits.
#[derive(Debug, Clone)]
pub struct RateLimitTable {
    classes: HashMap<String, RateLimitConfig>,
    fallback: RateLimitConfig,
}

impl RateLimitTable {
    pub fn new(fallback: RateLimitConfig) -> Self {
        RateLimitTable {
            classes: HashMap::new(),
            fallback,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>, config: RateLimitConfig) -> Self {
        let class = class.into();
        if class == DEFAULT_OPERATION {
            self.fallback = config;
        } else {
            self.classes.insert(class, config);
        }
        self
    }

    pub fn config_for(&self, class: &str) -> RateLimitConfig {
        self.classes.get(class).copied().unwrap_or(self.fallback)
    }
}

impl Default for RateLimitTable {
    fn default() -> Self {
        RateLimitTable::new(RateLimitConfig::per_minute(60))
            .with_class(CHAT_OPERATION, RateLimitConfig::per_minute(15))
            .with_class(INSIGHTS_OPERATION, RateLimitConfig::per_minute(30))
    }
}

/// Counter for one `(class, identifier)` key within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateLimitEntry {
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Outcome of a single `check_limit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    #[serde(skip)]
    pub reset_in: Duration,
}

impl RateLimitDecision {
    /// Seconds until the window resets, rounded up. Used for `X-RateLimit-Reset`.
    pub fn reset_in_secs(&self) -> u64 {
        let millis = u64::try_from(self.reset_in.as_millis()).unwrap_or(u64::MAX);
        millis.div_ceil(1000)
    }
}

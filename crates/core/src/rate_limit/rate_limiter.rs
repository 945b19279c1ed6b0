//! Fixed-window rate limiter keyed by operation class and caller.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;

use super::clock::{Clock, SystemClock};
use super::rate_limit_model::{RateLimitConfig, RateLimitDecision, RateLimitEntry, RateLimitTable};

/// Share of `check_limit` calls that also sweep expired entries.
pub const DEFAULT_SWEEP_PROBABILITY: f64 = 0.01;

type Key = (String, String);

/// In-memory fixed-window limiter.
///
/// State lives only in this process and is lost on restart. The map is sharded,
/// so the read-modify-write of one key only holds that key's shard lock.
pub struct RateLimiter {
    entries: DashMap<Key, RateLimitEntry>,
    table: RateLimitTable,
    clock: Arc<dyn Clock>,
    sweep_probability: f64,
}

impl RateLimiter {
    pub fn new(table: RateLimitTable) -> Self {
        Self::with_clock(table, Arc::new(SystemClock))
    }

    pub fn with_clock(table: RateLimitTable, clock: Arc<dyn Clock>) -> Self {
        RateLimiter {
            entries: DashMap::new(),
            table,
            clock,
            sweep_probability: DEFAULT_SWEEP_PROBABILITY,
        }
    }

    /// Overrides how often a check triggers a sweep. `0.0` disables it.
    pub fn with_sweep_probability(mut self, probability: f64) -> Self {
        self.sweep_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn table(&self) -> &RateLimitTable {
        &self.table
    }

    /// Counts one request for `identifier` under `operation_class` and reports
    /// whether it is admitted.
    ///
    /// Rejected requests do not touch the stored counter.
    pub fn check_limit(&self, identifier: &str, operation_class: &str) -> RateLimitDecision {
        // Sweep before taking the entry lock; `retain` visits every shard.
        if self.sweep_probability > 0.0 && rand::thread_rng().gen_bool(self.sweep_probability) {
            self.sweep_expired();
        }

        let config = self.table.config_for(operation_class);
        let now = self.clock.now();
        let key = (operation_class.to_string(), identifier.to_string());

        match self.entries.entry(key) {
            Entry::Vacant(vacant) => {
                vacant.insert(Self::fresh_entry(now, &config));
                Self::admitted_fresh(&config)
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired(now) {
                    *entry = Self::fresh_entry(now, &config);
                    return Self::admitted_fresh(&config);
                }

                let reset_in = entry.reset_at.saturating_duration_since(now);
                if entry.count >= config.max_requests {
                    return RateLimitDecision {
                        admitted: false,
                        limit: config.max_requests,
                        remaining: 0,
                        reset_in,
                    };
                }

                entry.count += 1;
                RateLimitDecision {
                    admitted: true,
                    limit: config.max_requests,
                    remaining: config.max_requests - entry.count,
                    reset_in,
                }
            }
        }
    }

    /// Drops every entry whose window has ended. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Discards all tracked windows.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fresh_entry(now: Instant, config: &RateLimitConfig) -> RateLimitEntry {
        RateLimitEntry {
            count: 1,
            reset_at: now + config.window,
        }
    }

    fn admitted_fresh(config: &RateLimitConfig) -> RateLimitDecision {
        RateLimitDecision {
            admitted: true,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(1),
            reset_in: config.window,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::{ManualClock, CHAT_OPERATION, DEFAULT_OPERATION, INSIGHTS_OPERATION};
    use std::time::Duration;

    fn limiter() -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(RateLimitTable::default(), clock.clone())
            .with_sweep_probability(0.0);
        (limiter, clock)
    }

    #[test]
    fn chat_admits_fifteen_then_rejects() {
        let (limiter, _) = limiter();

        for expected_remaining in (0..15).rev() {
            let decision = limiter.check_limit("u1", CHAT_OPERATION);
            assert!(decision.admitted);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let rejected = limiter.check_limit("u1", CHAT_OPERATION);
        assert!(!rejected.admitted);
        assert_eq!(rejected.remaining, 0);
        assert!(rejected.reset_in <= Duration::from_secs(60));
        assert_eq!(rejected.reset_in_secs(), 60);
    }

    #[test]
    fn first_request_reports_full_window() {
        let (limiter, _) = limiter();
        let decision = limiter.check_limit("u1", INSIGHTS_OPERATION);
        assert!(decision.admitted);
        assert_eq!(decision.limit, 30);
        assert_eq!(decision.remaining, 29);
        assert_eq!(decision.reset_in, Duration::from_secs(60));
    }

    #[test]
    fn rejection_does_not_consume_budget() {
        let (limiter, clock) = limiter();
        for _ in 0..15 {
            limiter.check_limit("u1", CHAT_OPERATION);
        }
        for _ in 0..5 {
            assert!(!limiter.check_limit("u1", CHAT_OPERATION).admitted);
        }
        clock.advance(Duration::from_secs(20));
        let decision = limiter.check_limit("u1", CHAT_OPERATION);
        assert!(!decision.admitted);
        assert_eq!(decision.reset_in, Duration::from_secs(40));
        assert_eq!(decision.reset_in_secs(), 40);
    }

    #[test]
    fn window_resets_after_reset_at() {
        let (limiter, clock) = limiter();
        for _ in 0..16 {
            limiter.check_limit("u1", CHAT_OPERATION);
        }

        // Exactly at reset_at the window is still live.
        clock.advance(Duration::from_secs(60));
        assert!(!limiter.check_limit("u1", CHAT_OPERATION).admitted);

        clock.advance(Duration::from_millis(1));
        let decision = limiter.check_limit("u1", CHAT_OPERATION);
        assert!(decision.admitted);
        assert_eq!(decision.remaining, 14);
        assert_eq!(decision.reset_in, Duration::from_secs(60));
    }

    #[test]
    fn keys_are_independent_across_identifiers_and_classes() {
        let (limiter, _) = limiter();
        for _ in 0..15 {
            limiter.check_limit("u1", CHAT_OPERATION);
        }
        assert!(!limiter.check_limit("u1", CHAT_OPERATION).admitted);

        let other_user = limiter.check_limit("u2", CHAT_OPERATION);
        assert!(other_user.admitted);
        assert_eq!(other_user.remaining, 14);

        let other_class = limiter.check_limit("u1", INSIGHTS_OPERATION);
        assert!(other_class.admitted);
        assert_eq!(other_class.remaining, 29);
        assert_eq!(limiter.len(), 3);
    }

    #[test]
    fn unknown_class_uses_default_limits_under_its_own_key() {
        let (limiter, _) = limiter();
        let unknown = limiter.check_limit("u1", "export");
        assert!(unknown.admitted);
        assert_eq!(unknown.remaining, 59);

        let default = limiter.check_limit("u1", DEFAULT_OPERATION);
        assert_eq!(default.remaining, 59);
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let (limiter, clock) = limiter();
        limiter.check_limit("old", CHAT_OPERATION);
        clock.advance(Duration::from_secs(30));
        limiter.check_limit("new", CHAT_OPERATION);
        clock.advance(Duration::from_secs(31));

        assert_eq!(limiter.sweep_expired(), 1);
        assert_eq!(limiter.len(), 1);

        limiter.clear();
        assert!(limiter.is_empty());
    }

    #[test]
    fn sweep_runs_on_check_when_probability_is_one() {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::with_clock(RateLimitTable::default(), clock.clone())
            .with_sweep_probability(1.0);
        limiter.check_limit("a", CHAT_OPERATION);
        limiter.check_limit("b", CHAT_OPERATION);
        clock.advance(Duration::from_secs(61));

        limiter.check_limit("c", CHAT_OPERATION);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn custom_table_overrides_defaults() {
        let table = RateLimitTable::default()
            .with_class(CHAT_OPERATION, RateLimitConfig::per_minute(2))
            .with_class(DEFAULT_OPERATION, RateLimitConfig::per_minute(5));
        assert_eq!(table.config_for(CHAT_OPERATION).max_requests, 2);
        assert_eq!(table.config_for("anything").max_requests, 5);
        assert_eq!(table.config_for(INSIGHTS_OPERATION).max_requests, 30);
    }

    #[test]
    fn concurrent_checks_never_over_admit() {
        let limiter = Arc::new(
            RateLimiter::with_clock(RateLimitTable::default(), Arc::new(ManualClock::new()))
                .with_sweep_probability(0.0),
        );
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..10)
                        .filter(|_| limiter.check_limit("shared", CHAT_OPERATION).admitted)
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 15);
    }
}

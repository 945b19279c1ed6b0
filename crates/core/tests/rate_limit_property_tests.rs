//! Property-based tests for the fixed-window rate limiter.
//!
//! These tests drive the limiter with random request sequences against a
//! manual clock and check the window invariants hold for every schedule.

use std::sync::Arc;
use std::time::Duration;

use finbot_core::rate_limit::{
    ManualClock, RateLimitConfig, RateLimitTable, RateLimiter, DEFAULT_OPERATION,
};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Generates a small limit and window so schedules cross boundaries often.
fn arb_config() -> impl Strategy<Value = RateLimitConfig> {
    (1u32..10, 1u64..20).prop_map(|(max_requests, window_secs)| RateLimitConfig {
        window: Duration::from_secs(window_secs),
        max_requests,
    })
}

/// Generates gaps (in ms) between consecutive requests.
fn arb_schedule() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..5_000, 1..80)
}

fn limiter(config: RateLimitConfig) -> (RateLimiter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let table = RateLimitTable::new(config);
    let limiter = RateLimiter::with_clock(table, clock.clone()).with_sweep_probability(0.0);
    (limiter, clock)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Within any single window no more than `max_requests` are admitted, and
    /// `remaining` always equals the budget left in that window.
    #[test]
    fn admitted_per_window_never_exceeds_max(config in arb_config(), gaps in arb_schedule()) {
        let (limiter, clock) = limiter(config);
        let mut window_end: Option<Duration> = None;
        let mut admitted_in_window = 0u32;
        let mut elapsed = Duration::ZERO;

        for gap in gaps {
            clock.advance(Duration::from_millis(gap));
            elapsed += Duration::from_millis(gap);

            if window_end.map_or(true, |end| elapsed > end) {
                window_end = Some(elapsed + config.window);
                admitted_in_window = 0;
            }

            let decision = limiter.check_limit("user", DEFAULT_OPERATION);
            if decision.admitted {
                admitted_in_window += 1;
                prop_assert_eq!(decision.remaining, config.max_requests - admitted_in_window);
            } else {
                prop_assert_eq!(decision.remaining, 0);
                prop_assert_eq!(admitted_in_window, config.max_requests);
            }
            prop_assert!(admitted_in_window <= config.max_requests);
            prop_assert!(decision.reset_in <= config.window);
        }
    }

    /// The reset header is the remaining window rounded up to whole seconds.
    #[test]
    fn reset_header_rounds_up(config in arb_config(), wait_ms in 0u64..20_000) {
        let (limiter, clock) = limiter(config);
        limiter.check_limit("user", DEFAULT_OPERATION);
        clock.advance(Duration::from_millis(wait_ms));
        let decision = limiter.check_limit("user", DEFAULT_OPERATION);

        let expected_ms = decision.reset_in.as_millis() as u64;
        prop_assert_eq!(decision.reset_in_secs(), expected_ms.div_ceil(1000));
        prop_assert!(decision.reset_in_secs() <= config.window.as_secs());
    }

    /// Distinct identifiers never share a budget.
    #[test]
    fn identifiers_are_isolated(config in arb_config(), users in 2usize..6) {
        let (limiter, _) = limiter(config);
        for _ in 0..config.max_requests {
            prop_assert!(limiter.check_limit("user-0", DEFAULT_OPERATION).admitted);
        }
        prop_assert!(!limiter.check_limit("user-0", DEFAULT_OPERATION).admitted);

        for i in 1..users {
            let decision = limiter.check_limit(&format!("user-{}", i), DEFAULT_OPERATION);
            prop_assert!(decision.admitted);
            prop_assert_eq!(decision.remaining, config.max_requests - 1);
        }
        prop_assert_eq!(limiter.len(), users);
    }
}

//! Rate limit module - in-memory fixed-window request limiting.

mod clock;
mod rate_limit_model;
mod rate_limiter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit_model::{
    RateLimitConfig, RateLimitDecision, RateLimitEntry, RateLimitTable, CHAT_OPERATION,
    DEFAULT_OPERATION, INSIGHTS_OPERATION,
};
pub use rate_limiter::{RateLimiter, DEFAULT_SWEEP_PROBABILITY};

//! Rate limit enforcement and the `X-RateLimit-*` response headers.

use std::convert::Infallible;

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use finbot_core::rate_limit::RateLimitDecision;

use crate::error::ApiError;
use crate::main_lib::AppState;

pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Renders a decision as `X-RateLimit-Remaining` / `X-RateLimit-Reset` (seconds).
#[derive(Debug, Clone, Copy)]
pub struct RateLimitHeaders(pub RateLimitDecision);

impl IntoResponseParts for RateLimitHeaders {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let headers = res.headers_mut();
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.0.remaining));
        headers.insert(X_RATELIMIT_RESET, HeaderValue::from(self.0.reset_in_secs()));
        Ok(res)
    }
}

/// Admits the request or fails with a 429 carrying the headers.
pub fn enforce(
    state: &AppState,
    user_id: &str,
    operation_class: &str,
) -> Result<RateLimitHeaders, ApiError> {
    let decision = state.rate_limiter.check_limit(user_id, operation_class);
    if decision.admitted {
        Ok(RateLimitHeaders(decision))
    } else {
        tracing::info!(
            "Rate limit hit for user {} on {}; resets in {}s",
            user_id,
            operation_class,
            decision.reset_in_secs()
        );
        Err(ApiError::RateLimited(decision))
    }
}

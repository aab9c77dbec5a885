//! Rate limiting port.

use async_trait::async_trait;
use std::time::Duration;

/// Per-client request budget, keyed by an opaque client identifier
/// (the remote address for HTTP).
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Spend one unit of `client`'s budget.
    async fn acquire(&self, client: &str) -> Result<RateDecision, RateLimitError>;
}

/// Outcome of [`RateLimiter::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Over budget; the next request may succeed after `retry_after`.
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter backend error: {0}")]
    Backend(String),
}

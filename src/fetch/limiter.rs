//! Shared request throttle.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Caps the send rate of every request that goes through it, no matter which
/// task issues the request. Clones share the same budget.
#[derive(Clone)]
pub struct Throttle {
    limiter: Option<Arc<DirectLimiter>>,
    period: Duration,
}

impl Throttle {
    /// Allow one request per `period`. A zero period disables throttling.
    pub fn per_period(period: Duration) -> Self {
        let limiter = Quota::with_period(period)
            .map(|q| q.allow_burst(NonZeroU32::MIN))
            .map(|q| Arc::new(RateLimiter::direct(q)));
        Self { limiter, period }
    }

    pub fn unlimited() -> Self {
        Self {
            limiter: None,
            period: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait until the next request may be sent.
    pub async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("period", &self.period)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_throttle_spaces_concurrent_requests() {
        let period = Duration::from_millis(100);
        let throttle = Throttle::per_period(period);
        let start = Instant::now();

        let waits = (0..4).map(|_| {
            let throttle = throttle.clone();
            async move {
                throttle.ready().await;
                Instant::now()
            }
        });
        let mut sent: Vec<Instant> = futures_util::future::join_all(waits).await;
        sent.sort();

        // First request goes straight through, the rest are spaced by the period.
        assert!(sent[0].duration_since(start) < period);
        assert!(sent[3].duration_since(sent[0]) >= period * 3 - Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_unlimited_throttle_does_not_wait() {
        let throttle = Throttle::unlimited();
        let start = Instant::now();
        for _ in 0..10 {
            throttle.ready().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_zero_period_disables_throttle() {
        let throttle = Throttle::per_period(Duration::ZERO);
        assert!(throttle.limiter.is_none());
    }
}

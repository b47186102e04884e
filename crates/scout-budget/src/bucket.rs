//! Token bucket limiter.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Token bucket for one `(platform, method)` pair.
///
/// Tokens refill continuously at `refill_rate` per second up to `capacity`.
/// All state changes happen under one lock, so concurrent callers can never
/// both spend the same tokens. Waiters are not served in FIFO order.
#[derive(Debug)]
pub struct RateBudget {
    capacity: f64,
    refill_rate: f64,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, capacity: f64, refill_rate: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = now;
    }
}

impl RateBudget {
    /// Create a full bucket holding `capacity` tokens that refills at `refill_rate` tokens per second.
    ///
    /// A zero capacity is raised to one token and a non-positive or non-finite
    /// rate is replaced by one token per hour, so the bucket can always make progress.
    #[must_use]
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        let capacity = f64::from(capacity.max(1));
        let refill_rate = if refill_rate.is_finite() && refill_rate > 0.0 {
            refill_rate
        } else {
            1.0 / 3600.0
        };

        Self {
            capacity,
            refill_rate,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Create a full bucket allowing `count` requests per `window`.
    #[must_use]
    pub fn per_window(count: u32, window: Duration) -> Self {
        let secs = window.as_secs_f64().max(f64::EPSILON);
        Self::new(count, f64::from(count.max(1)) / secs)
    }

    /// Maximum number of tokens.
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Tokens added per second.
    #[must_use]
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Currently available tokens, after refilling for elapsed time.
    pub async fn available(&self) -> f64 {
        let mut state = self.state.lock().await;
        state.refill(self.capacity, self.refill_rate);
        state.tokens
    }

    /// Try to remove `n` tokens without waiting.
    ///
    /// Returns `false` and leaves the bucket untouched when fewer than `n` tokens are available.
    pub async fn acquire(&self, n: u32) -> bool {
        let mut state = self.state.lock().await;
        state.refill(self.capacity, self.refill_rate);

        let n = f64::from(n);
        if state.tokens >= n {
            state.tokens -= n;
            true
        } else {
            debug!(
                requested = n,
                tokens = state.tokens,
                "rate budget exhausted"
            );
            false
        }
    }

    /// Remove `n` tokens, sleeping until enough have refilled.
    ///
    /// Never gives up; wrap in `tokio::time::timeout` to bound the wait.
    /// Requests above capacity are capped at capacity. Returns the total time spent waiting.
    pub async fn wait_and_acquire(&self, n: u32) -> Duration {
        let mut requested = f64::from(n);
        if requested > self.capacity {
            warn!(
                requested,
                capacity = self.capacity,
                "request exceeds bucket capacity, capping"
            );
            requested = self.capacity;
        }

        let started = Instant::now();
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                state.refill(self.capacity, self.refill_rate);
                if state.tokens >= requested {
                    state.tokens -= requested;
                    return started.elapsed();
                }
                ((requested - state.tokens) / self.refill_rate).max(0.0)
            };

            info!(
                wait_secs = wait,
                requested,
                "rate budget empty, waiting for refill"
            );
            tokio::time::sleep(Duration::from_secs_f64(wait)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_full_bucket_then_exhausted() {
        let budget = RateBudget::new(10, 10.0 / 3600.0);

        for _ in 0..10 {
            assert!(budget.acquire(1).await);
        }
        assert!(!budget.acquire(1).await);

        let available = budget.available().await;
        assert!((0.0..1.0).contains(&available));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_and_acquire_waits_one_refill_interval() {
        let budget = RateBudget::new(10, 10.0 / 3600.0);
        for _ in 0..10 {
            assert!(budget.acquire(1).await);
        }

        let waited = budget.wait_and_acquire(1).await;

        // One token at 10/3600 per second takes 360 s.
        let secs = waited.as_secs_f64();
        assert!(secs > 359.0 && secs < 361.0, "waited {secs}s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_never_exceeds_capacity() {
        let budget = RateBudget::new(5, 1.0);
        assert!(budget.acquire(5).await);

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!((budget.available().await - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_stay_in_bounds() {
        let budget = RateBudget::new(3, 0.5);
        for step in 0..50u32 {
            let _ = budget.acquire(step % 3).await;
            tokio::time::advance(Duration::from_millis(700)).await;
            let tokens = budget.available().await;
            assert!((0.0..=3.0).contains(&tokens), "tokens {tokens} out of range");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_acquire_does_not_spend() {
        let budget = RateBudget::new(4, 1.0);
        assert!(budget.acquire(3).await);
        assert!(!budget.acquire(2).await);
        assert!(budget.acquire(1).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquire_never_overspends() {
        let budget = Arc::new(RateBudget::new(10, 1.0 / 3600.0));

        let attempts = (0..50).map(|_| {
            let budget = Arc::clone(&budget);
            tokio::spawn(async move { budget.acquire(1).await })
        });
        let granted = futures::future::join_all(attempts)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(true)))
            .count();

        assert_eq!(granted, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_request_is_capped() {
        let budget = RateBudget::new(2, 1.0);
        let waited = budget.wait_and_acquire(5).await;
        assert_eq!(waited, Duration::ZERO);
        assert!(budget.available().await < 1.0);
    }

    #[test]
    fn test_per_window_rate() {
        let budget = RateBudget::per_window(200, Duration::from_secs(3600));
        assert!((budget.capacity() - 200.0).abs() < f64::EPSILON);
        assert!((budget.refill_rate() - 200.0 / 3600.0).abs() < 1e-12);
    }
}

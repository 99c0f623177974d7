use parking_lot::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Fixed-interval gate that paces outbound completion calls.
///
/// One limiter is created per pipeline invocation, so the pacing of one
/// request never delays another. Waiting is a timer-based suspension
/// (`tokio::time::sleep`), never a thread-blocking sleep.
pub struct RateLimiter {
    /// Timestamp of the last granted request, `None` until the first one
    last_request: Mutex<Option<Instant>>,
    /// Minimum delay between requests
    min_delay: Duration,
}

impl RateLimiter {
    /// Create a limiter that grants at most one request per `min_delay`.
    ///
    /// # Example
    /// ```
    /// use fed_analysis_backend::services::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // One completion call per second
    /// let limiter = RateLimiter::new(Duration::from_secs(1));
    /// assert_eq!(limiter.min_delay(), Duration::from_secs(1));
    /// ```
    pub fn new(min_delay: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_delay,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait until enough time has passed since the previous request.
    ///
    /// The first call returns immediately.
    pub async fn acquire(&self) {
        let wait_time = {
            let last = self.last_request.lock();
            match *last {
                Some(at) => {
                    let elapsed = at.elapsed();
                    (elapsed < self.min_delay).then(|| self.min_delay - elapsed)
                }
                None => None,
            }
        }; // Lock is dropped here

        if let Some(delay) = wait_time {
            sleep(delay).await;
        }

        *self.last_request.lock() = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_enforces_delay() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_secs(2), "Third request should wait ~2 seconds total");
        assert!(start.elapsed() < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_when_interval_already_elapsed() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        limiter.acquire().await;

        sleep(Duration::from_secs(2)).await;
        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_limiters_do_not_serialize_each_other() {
        let first = RateLimiter::new(Duration::from_secs(1));
        let second = RateLimiter::new(Duration::from_secs(1));
        first.acquire().await;

        let start = Instant::now();
        second.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

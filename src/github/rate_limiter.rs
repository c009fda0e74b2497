use reqwest::Response;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::time::{sleep, Duration};

/// Tracks the API quota reported by response headers and holds requests
/// back once it is exhausted, until the reported reset time.
pub struct RateLimiter {
    state: Arc<Mutex<RateLimitState>>,
}

struct RateLimitState {
    remaining: u32,
    reset_at: Option<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState {
                remaining: 5000,
                reset_at: None,
            })),
        }
    }

    pub async fn wait(&self) {
        let pause = {
            let state = self.lock();
            match state.reset_at {
                Some(reset_at) if state.remaining == 0 => {
                    reset_at.checked_duration_since(Instant::now())
                }
                _ => None,
            }
        };

        if let Some(wait_duration) = pause {
            tracing::info!("Rate limited, waiting {:?}", wait_duration);
            sleep(wait_duration).await;
        }

        let mut state = self.lock();
        if state.remaining == 0 {
            state.reset_at = None;
            // Unknown until the next response reports it.
            state.remaining = 1;
        }
    }

    pub fn update_from_response(&self, response: &Response) {
        let headers = response.headers();
        let Some(remaining) = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok())
        else {
            return;
        };
        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        self.record(remaining, reset);
    }

    fn record(&self, remaining: u32, reset_timestamp: Option<u64>) {
        let mut state = self.lock();
        state.remaining = remaining;
        if remaining < 100 {
            tracing::debug!("API quota low: {} requests remaining", remaining);
        }

        if let Some(reset_timestamp) = reset_timestamp {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            state.reset_at = (reset_timestamp > now)
                .then(|| Instant::now() + Duration::from_secs(reset_timestamp - now));
        }
    }

    pub fn remaining(&self) -> u32 {
        self.lock().remaining
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        // The state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exhausted_quota_with_past_reset_does_not_block() {
        let limiter = RateLimiter::new();
        limiter.record(0, Some(1));
        assert_eq!(limiter.remaining(), 0);

        limiter.wait().await;
        assert_eq!(limiter.remaining(), 1);
    }

    #[tokio::test]
    async fn test_remaining_tracked() {
        let limiter = RateLimiter::new();
        limiter.record(42, None);
        limiter.wait().await;
        assert_eq!(limiter.remaining(), 42);
    }
}

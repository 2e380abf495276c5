//! Request throttling over a rolling window
//!
//! The limiter grants a fixed number of requests per window. Once the budget
//! is spent, the caller is suspended for whatever is left of the window and
//! a new window starts. State is in-memory only; a restart resets it.

use crate::config::RateLimitConfig;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Rolling-window request budget
///
/// Callers are expected to be sequential: `acquire` takes `&mut self`, so no
/// locking is involved.
#[derive(Debug)]
pub struct RateLimiter {
    /// Requests allowed per window
    max_requests: u32,

    /// Window length
    window: Duration,

    /// Requests granted in the current window
    requests_in_window: u32,

    /// When the current window started
    window_start: Instant,
}

impl RateLimiter {
    /// Creates a limiter granting `max_requests` per `window`
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests_in_window: 0,
            window_start: Instant::now(),
        }
    }

    /// Creates a limiter from configuration
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Waits until a request is permitted, then counts it
    ///
    /// 1. If more than a full window has elapsed, the window is reset
    /// 2. If the budget is spent, sleeps for the rest of the window and resets
    /// 3. Counts the request
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.window_start) > self.window {
            self.reset(now);
        }

        if self.requests_in_window >= self.max_requests {
            let wait = self.remaining_window(now);
            tracing::info!(
                "Rate limit of {} requests per {:?} reached, waiting {:?}",
                self.max_requests,
                self.window,
                wait
            );
            sleep(wait).await;
            self.reset(Instant::now());
        }

        self.requests_in_window += 1;
        tracing::trace!(
            "Request {}/{} in current window",
            self.requests_in_window,
            self.max_requests
        );
    }

    /// Requests granted in the current window
    pub fn requests_in_window(&self) -> u32 {
        self.requests_in_window
    }

    /// Requests left before `acquire` would wait
    pub fn requests_remaining(&self) -> u32 {
        self.max_requests.saturating_sub(self.requests_in_window)
    }

    fn remaining_window(&self, now: Instant) -> Duration {
        self.window
            .saturating_sub(now.duration_since(self.window_start))
    }

    fn reset(&mut self, now: Instant) {
        self.requests_in_window = 0;
        self.window_start = now;
    }
}

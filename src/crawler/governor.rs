//! Call-rate governor for external inference requests
//!
//! The upstream inference API enforces a per-minute request quota. The
//! governor counts calls in fixed windows and blocks callers once the
//! window's quota is spent, so a crawl can run unattended without tripping
//! the upstream limiter.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Strategy interface for throttling external calls
///
/// `acquire` returns once the caller may issue one call, blocking for as
/// long as the strategy requires.
#[async_trait]
pub trait RateLimit: Send + Sync {
    async fn acquire(&self);
}

#[derive(Debug)]
struct WindowState {
    issued: u32,
    window_start: Instant,
}

/// Fixed-window counting limiter
///
/// Allows up to `quota` calls per window. Once the quota is spent, `acquire`
/// sleeps until the window has elapsed and then starts a fresh one. The
/// counter and the reset live under one lock held across the sleep, so
/// concurrent callers serialize and the quota holds under contention.
pub struct FixedWindowGovernor {
    quota: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindowGovernor {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota,
            window,
            state: Mutex::new(WindowState {
                issued: 0,
                window_start: Instant::now(),
            }),
        }
    }
}

#[async_trait]
impl RateLimit for FixedWindowGovernor {
    async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        if now.duration_since(state.window_start) >= self.window {
            state.window_start = now;
            state.issued = 0;
        }

        if state.issued >= self.quota {
            let reopens = state.window_start + self.window;
            tracing::debug!(
                "Call quota of {} spent, pausing until the window reopens",
                self.quota
            );
            tokio::time::sleep_until(reopens).await;
            state.window_start = Instant::now();
            state.issued = 0;
        }

        state.issued += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_within_quota_does_not_block() {
        let governor = FixedWindowGovernor::new(3, Duration::from_secs(60));

        let start = Instant::now();
        for _ in 0..3 {
            governor.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_acquire_blocks_once_quota_spent() {
        let governor = FixedWindowGovernor::new(2, Duration::from_millis(150));

        let start = Instant::now();
        for _ in 0..3 {
            governor.acquire().await;
        }

        // The third call had to wait out the rest of the window
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_elapsed_window_resets_counter() {
        let governor = FixedWindowGovernor::new(1, Duration::from_millis(100));
        governor.acquire().await;

        tokio::time::sleep(Duration::from_millis(120)).await;

        let start = Instant::now();
        governor.acquire().await;

        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_quota_holds_over_consecutive_windows() {
        // Six calls at two per window need at least two full window waits
        let governor = FixedWindowGovernor::new(2, Duration::from_millis(100));

        let start = Instant::now();
        for _ in 0..6 {
            governor.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_concurrent_acquires_serialize() {
        use std::sync::Arc;

        let governor = Arc::new(FixedWindowGovernor::new(2, Duration::from_millis(100)));

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let governor = Arc::clone(&governor);
            handles.push(tokio::spawn(async move { governor.acquire().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Four calls at two per window span at least one full window
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}

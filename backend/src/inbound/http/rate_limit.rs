//! In-process fixed-window rate limiting for hot endpoints.
//!
//! Each `(user, route)` pair gets a window that opens on its first request.
//! Requests beyond `max_requests` inside the window are refused with
//! `429 too_many_requests` until the window closes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::warn;

use crate::domain::{Error, UserId};

/// Requests allowed per window by default.
pub const DEFAULT_MAX_REQUESTS: u32 = 5;
/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: DateTime<Utc>,
    count: u32,
}

/// Fixed-window counter keyed by user and route.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<(UserId, &'static str), Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let window = i64::try_from(window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            max_requests,
            window,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for `user` on `route`.
    pub fn check(&self, user: &UserId, route: &'static str) -> Result<(), Error> {
        let now = self.clock.utc();
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| Error::internal("rate limiter state poisoned"))?;
        windows.retain(|_, w| now - w.opened_at < self.window);
        let entry = windows.entry((*user, route)).or_insert(Window {
            opened_at: now,
            count: 0,
        });
        if entry.count >= self.max_requests {
            warn!(user = %user, route, "rate limit exceeded");
            return Err(Error::too_many_requests("Too many requests"));
        }
        entry.count += 1;
        Ok(())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::MutableClock;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        Arc::new(MutableClock::at_date(date))
    }

    #[rstest]
    fn sixth_request_in_window_is_refused(clock: Arc<MutableClock>) {
        let limiter = RateLimiter::new(5, 60, clock);
        let user = UserId::random();
        for _ in 0..5 {
            assert!(limiter.check(&user, "contacts").is_ok());
        }
        let err = limiter.check(&user, "contacts").expect_err("sixth call limited");
        assert_eq!(err.code(), ErrorCode::TooManyRequests);
    }

    #[rstest]
    fn window_reopens_after_expiry(clock: Arc<MutableClock>) {
        let limiter = RateLimiter::new(1, 60, clock.clone());
        let user = UserId::random();
        assert!(limiter.check(&user, "contacts").is_ok());
        assert!(limiter.check(&user, "contacts").is_err());

        clock.advance_seconds(60);
        assert!(limiter.check(&user, "contacts").is_ok());
    }

    #[rstest]
    fn users_and_routes_are_counted_separately(clock: Arc<MutableClock>) {
        let limiter = RateLimiter::new(1, 60, clock);
        let ada = UserId::random();
        let grace = UserId::random();
        assert!(limiter.check(&ada, "list").is_ok());
        assert!(limiter.check(&ada, "create").is_ok());
        assert!(limiter.check(&grace, "list").is_ok());
        assert!(limiter.check(&ada, "list").is_err());
    }
}

//! Admission policies for per-client rate limiting
//!
//! A policy answers one question for a client key: may this request proceed
//! now? Policies are shared across all workers behind an `Arc`, so every
//! implementation keeps its per-key state in a concurrent map and performs the
//! check-and-consume step under that key's entry lock.

use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Rejected {
        /// Time until the client may be admitted again
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitConfigError {
    #[error("max_requests must be greater than 0")]
    ZeroRequests,

    #[error("window must be longer than zero")]
    ZeroWindow,

    #[error("window is too short for {0} requests")]
    WindowTooShort(u32),
}

/// Pluggable admission strategy
///
/// Handlers never see this trait; it is injected into
/// [`RateLimitMiddleware`](crate::RateLimitMiddleware) so alternative
/// strategies can be swapped without touching routes.
pub trait RateLimitPolicy: Send + Sync {
    /// Consume one unit of the client's allowance if available
    fn check(&self, key: &str) -> RateLimitDecision;

    /// Short label used in logs and metrics
    fn name(&self) -> &'static str;

    /// Drop state for clients whose allowance has fully recovered
    fn purge_expired(&self) {}
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter: at most `max_requests` per client per `window`
///
/// The window for a key starts with that key's first request and resets once
/// `window` has elapsed. Counting happens under the map entry lock, so two
/// concurrent requests can never both take the last slot.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitConfigError> {
        if max_requests == 0 {
            return Err(RateLimitConfigError::ZeroRequests);
        }
        if window.is_zero() {
            return Err(RateLimitConfigError::ZeroWindow);
        }

        Ok(Self {
            max_requests,
            window,
            windows: DashMap::new(),
        })
    }

    /// Admission check against an explicit clock reading
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.saturating_duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            RateLimitDecision::Allowed
        } else {
            let elapsed = now.saturating_duration_since(entry.started);
            RateLimitDecision::Rejected {
                retry_after: self.window.saturating_sub(elapsed),
            }
        }
    }

    pub fn purge_expired_at(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

impl RateLimitPolicy for FixedWindowLimiter {
    fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn name(&self) -> &'static str {
        "fixed_window"
    }

    fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }
}

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Token bucket backed by `governor` (GCRA)
///
/// Holds up to `max_requests` tokens per client and refills one token every
/// `window / max_requests`, so sustained throughput matches the fixed window
/// while bursts drain smoothly instead of resetting all at once.
pub struct TokenBucketLimiter {
    limiter: KeyedLimiter,
    clock: DefaultClock,
}

impl TokenBucketLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitConfigError> {
        let burst = NonZeroU32::new(max_requests).ok_or(RateLimitConfigError::ZeroRequests)?;
        if window.is_zero() {
            return Err(RateLimitConfigError::ZeroWindow);
        }

        let quota = Quota::with_period(window / max_requests)
            .ok_or(RateLimitConfigError::WindowTooShort(max_requests))?
            .allow_burst(burst);

        Ok(Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        })
    }
}

impl RateLimitPolicy for TokenBucketLimiter {
    fn check(&self, key: &str) -> RateLimitDecision {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => RateLimitDecision::Allowed,
            Err(not_until) => RateLimitDecision::Rejected {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    fn name(&self) -> &'static str {
        "token_bucket"
    }

    fn purge_expired(&self) {
        self.limiter.retain_recent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_window_rejects_zero_config() {
        assert_eq!(
            FixedWindowLimiter::new(0, Duration::from_secs(60)).err(),
            Some(RateLimitConfigError::ZeroRequests)
        );
        assert_eq!(
            FixedWindowLimiter::new(10, Duration::ZERO).err(),
            Some(RateLimitConfigError::ZeroWindow)
        );
    }

    #[test]
    fn test_fixed_window_admits_up_to_capacity() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60)).unwrap();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("10.0.0.1", now).is_allowed());
        }

        match limiter.check_at("10.0.0.1", now + Duration::from_secs(15)) {
            RateLimitDecision::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(45));
            }
            RateLimitDecision::Allowed => panic!("fourth request must be rejected"),
        }
    }

    #[test]
    fn test_fixed_window_resets_after_window() {
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(60)).unwrap();
        let start = Instant::now();

        assert!(limiter.check_at("client", start).is_allowed());
        assert!(limiter.check_at("client", start).is_allowed());
        assert!(!limiter.check_at("client", start + Duration::from_secs(59)).is_allowed());

        let later = start + Duration::from_secs(60);
        assert!(limiter.check_at("client", later).is_allowed());
        assert!(limiter.check_at("client", later).is_allowed());
        assert!(!limiter.check_at("client", later).is_allowed());
    }

    #[test]
    fn test_fixed_window_keys_are_independent() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(60)).unwrap();
        let now = Instant::now();

        assert!(limiter.check_at("a", now).is_allowed());
        assert!(!limiter.check_at("a", now).is_allowed());
        assert!(limiter.check_at("b", now).is_allowed());
    }

    #[test]
    fn test_fixed_window_purge_drops_expired_clients() {
        let limiter = FixedWindowLimiter::new(5, Duration::from_secs(10)).unwrap();
        let start = Instant::now();

        limiter.check_at("old", start);
        limiter.check_at("fresh", start + Duration::from_secs(8));
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.purge_expired_at(start + Duration::from_secs(12));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_fixed_window_concurrent_admissions_never_exceed_capacity() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let limiter = Arc::new(FixedWindowLimiter::new(50, Duration::from_secs(60)).unwrap());
        let admitted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        if limiter.check("shared").is_allowed() {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_token_bucket_allows_burst_then_rejects() {
        let limiter = TokenBucketLimiter::new(3, Duration::from_secs(60)).unwrap();

        for _ in 0..3 {
            assert!(limiter.check("client").is_allowed());
        }

        match limiter.check("client") {
            RateLimitDecision::Rejected { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(20));
            }
            RateLimitDecision::Allowed => panic!("burst exhausted, must reject"),
        }

        assert!(limiter.check("other-client").is_allowed());
    }

    #[test]
    fn test_token_bucket_rejects_zero_config() {
        assert_eq!(
            TokenBucketLimiter::new(0, Duration::from_secs(60)).err(),
            Some(RateLimitConfigError::ZeroRequests)
        );
        assert_eq!(
            TokenBucketLimiter::new(5, Duration::ZERO).err(),
            Some(RateLimitConfigError::ZeroWindow)
        );
    }

    #[test]
    fn test_policy_names() {
        let fixed = FixedWindowLimiter::new(1, Duration::from_secs(1)).unwrap();
        let bucket = TokenBucketLimiter::new(1, Duration::from_secs(1)).unwrap();
        assert_eq!(fixed.name(), "fixed_window");
        assert_eq!(bucket.name(), "token_bucket");
    }
}

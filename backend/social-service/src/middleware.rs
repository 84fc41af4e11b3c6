/// Rate limiting wiring for social-service
use crate::config::{RateLimitConfig, RateLimitStrategy};
use actix_middleware::{
    FixedWindowLimiter, RateLimitConfigError, RateLimitMiddleware, RateLimitPolicy,
    TokenBucketLimiter,
};
use std::sync::Arc;
use std::time::Duration;

/// Build the admission policy selected by configuration
pub fn rate_limit_policy(
    config: &RateLimitConfig,
) -> Result<Arc<dyn RateLimitPolicy>, RateLimitConfigError> {
    let policy: Arc<dyn RateLimitPolicy> = match config.strategy {
        RateLimitStrategy::FixedWindow => Arc::new(FixedWindowLimiter::new(
            config.max_requests,
            config.window(),
        )?),
        RateLimitStrategy::TokenBucket => Arc::new(TokenBucketLimiter::new(
            config.max_requests,
            config.window(),
        )?),
    };

    Ok(policy)
}

/// Middleware applying `policy` with the service's proxy-header setting
pub fn rate_limiter(
    policy: Arc<dyn RateLimitPolicy>,
    config: &RateLimitConfig,
) -> RateLimitMiddleware {
    RateLimitMiddleware::new(policy).trust_proxy_headers(config.trust_proxy_headers)
}

/// Periodically drop limiter state for clients that have gone quiet
///
/// Must be called from within a Tokio runtime.
pub fn spawn_purge_task(policy: Arc<dyn RateLimitPolicy>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            policy.purge_expired();
            tracing::trace!(policy = policy.name(), "Purged idle rate limit state");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(strategy: RateLimitStrategy) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: 2,
            window_seconds: 60,
            strategy,
            trust_proxy_headers: false,
        }
    }

    #[test]
    fn test_policy_follows_strategy() {
        let fixed = rate_limit_policy(&config(RateLimitStrategy::FixedWindow)).unwrap();
        assert_eq!(fixed.name(), "fixed_window");

        let bucket = rate_limit_policy(&config(RateLimitStrategy::TokenBucket)).unwrap();
        assert_eq!(bucket.name(), "token_bucket");
    }

    #[test]
    fn test_policy_enforces_capacity() {
        let policy = rate_limit_policy(&config(RateLimitStrategy::FixedWindow)).unwrap();
        assert!(policy.check("client").is_allowed());
        assert!(policy.check("client").is_allowed());
        assert!(!policy.check("client").is_allowed());
    }

    #[test]
    fn test_zero_requests_rejected() {
        let mut cfg = config(RateLimitStrategy::FixedWindow);
        cfg.max_requests = 0;
        assert_eq!(
            rate_limit_policy(&cfg).err(),
            Some(RateLimitConfigError::ZeroRequests)
        );
    }
}

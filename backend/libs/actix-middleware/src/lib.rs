//! # Actix Middleware Library
//!
//! Unified middleware components for Nova Actix services
//!
//! ## Modules
//! - `limiter`: Admission policies (fixed window, token bucket)
//! - `rate_limit`: Per-client rate limiting middleware over any policy
//! - `metrics`: Prometheus metrics middleware and exposition

pub mod limiter;
pub mod metrics;
pub mod rate_limit;

pub use limiter::{
    FixedWindowLimiter, RateLimitConfigError, RateLimitDecision, RateLimitPolicy,
    TokenBucketLimiter,
};
pub use metrics::MetricsMiddleware;
pub use rate_limit::{RateLimitMiddleware, DEFAULT_REJECTION_MESSAGE};

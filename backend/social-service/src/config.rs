/// Configuration management for Social Service
///
/// Loads configuration from environment variables. Every value has a default
/// suitable for local development; malformed values are rejected rather than
/// silently replaced.
use crypto_core::HashCost;
use db_pool::{env_or, parse_env_or, DbConfig};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const SERVICE_NAME: &str = "social-service";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database pool configuration
    pub database: DbConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Credential hashing cost
    pub password_hash: HashCost,
    /// Feed pagination defaults
    pub feed: FeedConfig,
    /// WebSocket notification sessions
    pub notifications: NotificationsConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStrategy {
    FixedWindow,
    TokenBucket,
}

impl FromStr for RateLimitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed_window" => Ok(Self::FixedWindow),
            "token_bucket" => Ok(Self::TokenBucket),
            other => Err(format!(
                "RATE_LIMIT_STRATEGY must be 'fixed_window' or 'token_bucket', got '{}'",
                other
            )),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per client per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    pub strategy: RateLimitStrategy,
    /// Key clients by `X-Forwarded-For`/`Forwarded` instead of the peer address
    pub trust_proxy_headers: bool,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Feed pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size used when the client omits `limit`
    pub default_page_size: i64,
}

/// Heartbeat settings for `/ws/` sessions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Seconds between server pings
    pub heartbeat_interval_secs: u64,
    /// A session silent for this long is dropped
    pub client_timeout_secs: u64,
}

impl NotificationsConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 5,
            client_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = env_or("APP_ENV", "development");

        let app = AppConfig {
            env: app_env,
            host: env_or("SOCIAL_SERVICE_HOST", "0.0.0.0"),
            port: parse_env_or("SOCIAL_SERVICE_PORT", 8082u16)?,
        };

        let allowed_origins = env_or(
            "CORS_ALLOWED_ORIGINS",
            "http://127.0.0.1:8000,http://localhost:8000",
        );
        let cors = CorsConfig { allowed_origins };
        for origin in cors.origins() {
            if origin == "*" {
                if app.is_production() {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }
            } else if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(format!(
                    "CORS_ALLOWED_ORIGINS entry '{}' must start with http:// or https://",
                    origin
                ));
            }
        }

        let rate_limit = RateLimitConfig {
            max_requests: parse_env_or("RATE_LIMIT_MAX_REQUESTS", 10u32)?,
            window_seconds: parse_env_or("RATE_LIMIT_WINDOW_SECONDS", 60u64)?,
            strategy: env_or("RATE_LIMIT_STRATEGY", "fixed_window").parse()?,
            trust_proxy_headers: parse_env_or("RATE_LIMIT_TRUST_PROXY_HEADERS", false)?,
        };
        if rate_limit.max_requests == 0 {
            return Err("RATE_LIMIT_MAX_REQUESTS must be greater than 0".to_string());
        }
        if rate_limit.window_seconds == 0 {
            return Err("RATE_LIMIT_WINDOW_SECONDS must be greater than 0".to_string());
        }

        let password_hash = env_or("PASSWORD_HASH_PROFILE", "default")
            .parse::<HashCost>()
            .map_err(|e| format!("PASSWORD_HASH_PROFILE: {}", e))?;

        let feed = FeedConfig {
            default_page_size: parse_env_or("FEED_DEFAULT_PAGE_SIZE", 10i64)?,
        };
        if feed.default_page_size < 1 {
            return Err("FEED_DEFAULT_PAGE_SIZE must be at least 1".to_string());
        }

        let defaults = NotificationsConfig::default();
        let notifications = NotificationsConfig {
            heartbeat_interval_secs: parse_env_or(
                "WS_HEARTBEAT_INTERVAL_SECS",
                defaults.heartbeat_interval_secs,
            )?,
            client_timeout_secs: parse_env_or("WS_CLIENT_TIMEOUT_SECS", defaults.client_timeout_secs)?,
        };
        if notifications.heartbeat_interval_secs == 0 {
            return Err("WS_HEARTBEAT_INTERVAL_SECS must be greater than 0".to_string());
        }
        if notifications.client_timeout_secs <= notifications.heartbeat_interval_secs {
            return Err(
                "WS_CLIENT_TIMEOUT_SECS must be greater than WS_HEARTBEAT_INTERVAL_SECS".to_string(),
            );
        }

        Ok(Config {
            app,
            cors,
            database: DbConfig::from_env(SERVICE_NAME)?,
            rate_limit,
            password_hash,
            feed,
            notifications,
        })
    }
}

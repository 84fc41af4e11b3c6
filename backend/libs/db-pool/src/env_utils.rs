//! Environment variable parsing utilities
//!
//! Missing variables fall back to a default. Present but malformed values are
//! reported as errors so a typo in deployment config fails startup.

use std::fmt::Display;
use std::str::FromStr;

/// Parse an environment variable, using `default` when it is unset
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_or("PORT", 8082)?;
/// ```
pub fn parse_env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, value, e)),
        Err(_) => Ok(default),
    }
}

/// Read a string environment variable, using `default` when it is unset or blank
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_parse_env_or_missing_uses_default() {
        std::env::remove_var("DB_POOL_TEST_MISSING");
        let value: u32 = parse_env_or("DB_POOL_TEST_MISSING", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_env_or_valid_value() {
        std::env::set_var("DB_POOL_TEST_VALID", " 17 ");
        let value: u32 = parse_env_or("DB_POOL_TEST_VALID", 42).unwrap();
        assert_eq!(value, 17);
        std::env::remove_var("DB_POOL_TEST_VALID");
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_env_or_invalid_value_is_error() {
        std::env::set_var("DB_POOL_TEST_INVALID", "lots");
        let result: Result<u32, _> = parse_env_or("DB_POOL_TEST_INVALID", 42);
        let err = result.unwrap_err();
        assert!(err.contains("DB_POOL_TEST_INVALID"));
        std::env::remove_var("DB_POOL_TEST_INVALID");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_or_blank_uses_default() {
        std::env::set_var("DB_POOL_TEST_BLANK", "   ");
        assert_eq!(env_or("DB_POOL_TEST_BLANK", "fallback"), "fallback");
        std::env::remove_var("DB_POOL_TEST_BLANK");
    }
}

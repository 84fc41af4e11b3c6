/// Input validation utilities for social service
use crate::error::AppError;
use validator::ValidationError;

pub const INVALID_PAGE_MESSAGE: &str = "Invalid page number";
pub const INVALID_LIMIT_MESSAGE: &str = "Invalid limit number";
pub const EMPTY_CONTENT_MESSAGE: &str = "content must not be empty";

/// Parse an optional pagination parameter that must be a positive integer
///
/// An absent parameter yields `default`; anything present that is not an
/// integer `>= 1` is a `BadRequest` carrying `message`.
pub fn parse_positive(raw: Option<&str>, default: i64, message: &str) -> Result<i64, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

/// Reject post bodies that are empty or whitespace only
pub fn validate_post_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest(EMPTY_CONTENT_MESSAGE.to_string()));
    }
    Ok(())
}

/// Usernames made only of whitespace count as missing
pub fn username_not_blank(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("username is required".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_default() {
        assert_eq!(parse_positive(None, 10, INVALID_LIMIT_MESSAGE).unwrap(), 10);
    }

    #[test]
    fn test_parse_positive_accepts_values() {
        assert_eq!(parse_positive(Some("1"), 10, INVALID_PAGE_MESSAGE).unwrap(), 1);
        assert_eq!(parse_positive(Some(" 25 "), 10, INVALID_PAGE_MESSAGE).unwrap(), 25);
    }

    #[test]
    fn test_parse_positive_rejects_bad_input() {
        for raw in ["0", "-3", "abc", "", "1.5", "99999999999999999999"] {
            match parse_positive(Some(raw), 10, INVALID_PAGE_MESSAGE) {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_PAGE_MESSAGE),
                other => panic!("expected BadRequest for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_post_content() {
        assert!(validate_post_content("hola mundo").is_ok());
        assert!(validate_post_content("").is_err());
        assert!(validate_post_content("  \n\t").is_err());
    }

    #[test]
    fn test_username_not_blank() {
        assert!(username_not_blank("ana").is_ok());
        assert!(username_not_blank("").is_err());
        assert!(username_not_blank(" \t ").is_err());
    }
}

/// Data models for social-service
///
/// Row types returned by the store and the request/response bodies of the
/// HTTP surface. The password hash is deliberately absent from every type
/// that can be serialized to a client.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Identity and timestamp assigned to a freshly inserted post
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct CreatedPost {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// Feed entry: a post joined with its author's username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct FeedPost {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

/// Body of `POST /api/users/register`
///
/// Missing fields deserialize as empty strings so they are reported by
/// validation rather than as a JSON parse failure.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::validators::username_not_blank"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: i64,
}

/// Body of `POST /api/posts/create`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePostResponse {
    pub message: &'static str,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
}

/// Raw query string of `GET /api/posts/feed`
///
/// Kept as strings so non-numeric input can be reported with a specific
/// message instead of a generic query-parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

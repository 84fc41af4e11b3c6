/// HTTP request handlers
///
/// - `users`: registration and profile lookup
/// - `posts`: post creation and the paginated feed
/// - `health`: liveness, readiness and metrics exposition
/// - `notifications`: greeting and the `/ws/` upgrade
pub mod health;
pub mod notifications;
pub mod posts;
pub mod users;

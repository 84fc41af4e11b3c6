//! Social Service
//!
//! A small social-network backend: users register, publish short text posts
//! and read a paginated, reverse-chronological feed. Every route sits behind a
//! per-client rate limiter.
//!
//! # Routes
//!
//! - `POST /api/users/register` - create a user (password stored as Argon2id digest)
//! - `GET /api/users/{username}` - public profile
//! - `POST /api/posts/create` - publish a post
//! - `GET /api/posts/feed?page=&limit=` - newest posts first
//! - `GET /api/health`, `GET /api/health/ready`, `GET /metrics`
//! - `GET /` - notification server greeting
//! - `GET /ws/` - WebSocket: echoes text frames, pushes a `post_created`
//!   frame whenever a post is published

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod routes;
pub mod validators;

use config::FeedConfig;
use crypto_core::PasswordHasher;
use db::Store;
use notifications::Notifier;
use std::sync::Arc;

/// Shared state handed to every handler
///
/// Owned explicitly and injected through `web::Data`, so tests can build one
/// around an in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub hasher: PasswordHasher,
    pub feed: FeedConfig,
    pub notifications: Notifier,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
        feed: FeedConfig,
        notifications: Notifier,
    ) -> Self {
        Self {
            store,
            hasher,
            feed,
            notifications,
        }
    }
}

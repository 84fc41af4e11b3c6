/// Database access layer
///
/// - `schema`: idempotent table and index creation, run once at boot
/// - `user_repo` / `post_repo`: one statement per function over a `SqlitePool`
/// - [`Store`]: the capability handlers depend on, with [`SqliteStore`] as the
///   production implementation
pub mod post_repo;
pub mod schema;
pub mod user_repo;

use crate::config::SERVICE_NAME;
use crate::models::{CreatedPost, FeedPost, UserProfile};
use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already exists")]
    Conflict,

    #[error("referenced author does not exist")]
    UnknownAuthor,

    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict;
            }
            if db.is_foreign_key_violation() {
                return StoreError::UnknownAuthor;
            }
        }

        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err)
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Persistent storage for users and posts
///
/// Every write is a single atomic statement; no operation spans a transaction.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user, returning the assigned identifier
    ///
    /// Fails with [`StoreError::Conflict`] if the username or email is taken.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError>;

    /// Look up a user's public profile; never exposes the password hash
    async fn get_user_by_username(&self, username: &str) -> Result<UserProfile, StoreError>;

    /// Insert a post stamped with the store's clock
    ///
    /// Fails with [`StoreError::UnknownAuthor`] if `user_id` references no user.
    async fn create_post(&self, user_id: i64, content: &str) -> Result<CreatedPost, StoreError>;

    /// One page of the feed, newest first; `page` and `page_size` must be >= 1
    async fn list_feed(&self, page: i64, page_size: i64) -> Result<Vec<FeedPost>, StoreError>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> Result<(), StoreError>;
}

/// [`Store`] backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        Ok(user_repo::create_user(&self.pool, username, email, password_hash).await?)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<UserProfile, StoreError> {
        user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create_post(&self, user_id: i64, content: &str) -> Result<CreatedPost, StoreError> {
        Ok(post_repo::create_post(&self.pool, user_id, content).await?)
    }

    async fn list_feed(&self, page: i64, page_size: i64) -> Result<Vec<FeedPost>, StoreError> {
        let offset = post_repo::page_offset(page, page_size);
        Ok(post_repo::list_feed(&self.pool, page_size, offset).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = db_pool::acquire_with_metrics(&self.pool, SERVICE_NAME).await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }
}

#![allow(dead_code, unused_macros)]

use actix_middleware::{FixedWindowLimiter, RateLimitPolicy};
use actix_web::{dev::ServerHandle, web, App, HttpServer};
use crypto_core::{HashCost, PasswordHasher};
use social_service::config::{FeedConfig, NotificationsConfig};
use social_service::db::{schema, SqliteStore};
use social_service::notifications::Notifier;
use social_service::AppState;
use sqlx::SqlitePool;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

/// Build an actix test service over `state`, wired like the binary
macro_rules! init_app {
    ($state:expr, $policy:expr, cors = $cors:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(social_service::routes::configure)
                .wrap(actix_middleware::MetricsMiddleware)
                .wrap(actix_middleware::RateLimitMiddleware::new($policy))
                .wrap(social_service::routes::cors(&$cors)),
        )
        .await
    };
    ($state:expr, $policy:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(social_service::routes::configure)
                .wrap(actix_middleware::MetricsMiddleware)
                .wrap(actix_middleware::RateLimitMiddleware::new($policy)),
        )
        .await
    };
    ($state:expr) => {
        init_app!($state, $crate::common::generous_policy())
    };
}

pub async fn test_pool() -> SqlitePool {
    let pool = db_pool::create_in_memory_pool()
        .await
        .expect("in-memory pool");
    schema::init_schema(&pool).await.expect("schema");
    pool
}

/// State over `pool`; must be called inside an actix runtime
pub fn test_state(pool: &SqlitePool) -> web::Data<AppState> {
    test_state_with(pool, NotificationsConfig::default())
}

pub fn test_state_with(pool: &SqlitePool, notifications: NotificationsConfig) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(SqliteStore::new(pool.clone())),
        PasswordHasher::new(HashCost::fast()).expect("hasher"),
        FeedConfig {
            default_page_size: 10,
        },
        Notifier::start(notifications),
    ))
}

/// Serve the full route table on an ephemeral local port
pub async fn start_server(state: web::Data<AppState>) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let policy = generous_policy();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(social_service::routes::configure)
            .wrap(actix_middleware::MetricsMiddleware)
            .wrap(actix_middleware::RateLimitMiddleware::new(policy.clone()))
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_rt::spawn(server);
    Ok((addr, handle))
}

/// A limiter loose enough that functional tests never hit it
pub fn generous_policy() -> Arc<dyn RateLimitPolicy> {
    Arc::new(FixedWindowLimiter::new(10_000, Duration::from_secs(60)).expect("policy"))
}

/// Insert a user directly, bypassing hashing
pub async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
    social_service::db::user_repo::create_user(
        pool,
        username,
        &format!("{}@example.com", username),
        "not-a-real-digest",
    )
    .await
    .expect("insert user")
}

/// Insert a post with an explicit timestamp
pub async fn insert_post_at(pool: &SqlitePool, user_id: i64, content: &str, created_at: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO posts (user_id, content, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(content)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .expect("insert post");
    id
}

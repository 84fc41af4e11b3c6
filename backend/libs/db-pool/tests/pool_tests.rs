//! Pool construction tests against real SQLite databases
//!
//! Coverage:
//! - File-backed pool creation (file created on demand)
//! - Foreign-key enforcement on pooled connections
//! - In-memory pool keeps its data across statements
//! - Metrics-instrumented acquisition

use db_pool::{acquire_with_metrics, create_in_memory_pool, create_pool, DbConfig};
use sqlx::Row;

fn file_config(dir: &tempfile::TempDir) -> DbConfig {
    DbConfig {
        service_name: "pool-test".to_string(),
        database_url: format!("sqlite://{}", dir.path().join("pool_test.db").display()),
        max_connections: 2,
        min_connections: 1,
        ..DbConfig::default()
    }
}

#[tokio::test]
async fn test_create_pool_creates_database_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = file_config(&dir);

    let pool = create_pool(config).await.expect("pool should open");

    assert!(dir.path().join("pool_test.db").exists());
    let row = sqlx::query("SELECT 1 AS one")
        .fetch_one(&pool)
        .await
        .expect("select should succeed");
    assert_eq!(row.get::<i64, _>("one"), 1);

    pool.close().await;
}

#[tokio::test]
async fn test_pooled_connections_enforce_foreign_keys() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool = create_pool(file_config(&dir)).await.expect("pool should open");

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .expect("pragma should succeed");
    assert_eq!(enabled, 1);

    sqlx::query("CREATE TABLE parent (id INTEGER PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL REFERENCES parent(id))")
        .execute(&pool)
        .await
        .unwrap();

    let err = sqlx::query("INSERT INTO child (parent_id) VALUES (99)")
        .execute(&pool)
        .await
        .expect_err("orphan insert must fail");
    let db_err = err.as_database_error().expect("should be a database error");
    assert!(db_err.is_foreign_key_violation());

    pool.close().await;
}

#[tokio::test]
async fn test_in_memory_pool_retains_state() {
    let pool = create_in_memory_pool().await.expect("memory pool should open");

    sqlx::query("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO notes (body) VALUES ('first'), ('second')")
        .execute(&pool)
        .await
        .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_acquire_with_metrics_returns_usable_connection() {
    let pool = create_in_memory_pool().await.expect("memory pool should open");

    let mut conn = acquire_with_metrics(&pool, "pool-test")
        .await
        .expect("acquire should succeed");
    let value: i64 = sqlx::query_scalar("SELECT 7")
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(value, 7);
}

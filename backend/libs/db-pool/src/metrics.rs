//! Pool gauges and acquisition instrumentation
//!
//! Exported series:
//! - `db_pool_connections{service,state}` with state `idle`, `active` or `max`
//! - `db_pool_acquire_duration_seconds{service}`
//! - `db_pool_connection_errors_total{service,error_type}`

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, Sqlite, SqlitePool};
use std::time::Instant;

/// SQLite primary result codes that mean another connection holds the lock
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

lazy_static::lazy_static! {
    static ref POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Connections in the pool by state",
        &["service", "state"]
    ).expect("Prometheus metrics registration should succeed at startup");

    static ref POOL_ACQUIRE_SECONDS: HistogramVec = register_histogram_vec!(
        "db_pool_acquire_duration_seconds",
        "Time spent waiting for a pooled connection",
        &["service"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    static ref POOL_ERRORS: IntCounterVec = register_int_counter_vec!(
        "db_pool_connection_errors_total",
        "Failed connection acquisitions by cause",
        &["service", "error_type"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Point-in-time view of pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub idle: u32,
    pub active: u32,
    pub max: u32,
}

impl PoolStats {
    pub fn of(pool: &SqlitePool) -> Self {
        let size = pool.size();
        let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX).min(size);

        Self {
            idle,
            active: size - idle,
            max: pool.options().get_max_connections(),
        }
    }

    fn publish(&self, service: &str) {
        for (state, value) in [("idle", self.idle), ("active", self.active), ("max", self.max)] {
            POOL_CONNECTIONS
                .with_label_values(&[service, state])
                .set(i64::from(value));
        }
    }
}

/// Refresh the pool gauges for `service`
pub(crate) fn update_pool_metrics(pool: &SqlitePool, service: &str) -> PoolStats {
    let stats = PoolStats::of(pool);
    stats.publish(service);
    stats
}

fn error_kind(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        sqlx::Error::Io(_) => "io",
        sqlx::Error::Database(db) => database_error_kind(db.code().as_deref()),
        _ => "other",
    }
}

fn database_error_kind(code: Option<&str>) -> &'static str {
    // Extended result codes keep the primary code in the low byte
    let primary = code
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff);

    match primary {
        Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => "locked",
        _ => "database",
    }
}

/// `pool.acquire()` with latency and failure accounting under `service`
pub async fn acquire_with_metrics(
    pool: &SqlitePool,
    service: &str,
) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
    let started = Instant::now();
    let result = pool.acquire().await;

    POOL_ACQUIRE_SECONDS
        .with_label_values(&[service])
        .observe(started.elapsed().as_secs_f64());

    if let Err(e) = &result {
        POOL_ERRORS
            .with_label_values(&[service, error_kind(e)])
            .inc();
    }

    result
}

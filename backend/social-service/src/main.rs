use actix_middleware::MetricsMiddleware;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context, Result};
use crypto_core::PasswordHasher;
use social_service::config::{Config, SERVICE_NAME};
use social_service::db::{schema, SqliteStore};
use social_service::notifications::Notifier;
use social_service::{middleware, routes, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    if cfg!(debug_assertions) {
        dotenvy::dotenv().ok();
    }

    init_tracing();
    info!("Starting {}", SERVICE_NAME);

    let config = Config::from_env().map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    info!(
        env = %config.app.env,
        host = %config.app.host,
        port = config.app.port,
        rate_limit_strategy = ?config.rate_limit.strategy,
        rate_limit_max_requests = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_seconds,
        "Configuration loaded"
    );

    config.database.log_config();
    let pool = db_pool::create_pool(config.database.clone())
        .await
        .context("Failed to open database")?;
    schema::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    let hasher = PasswordHasher::new(config.password_hash)
        .context("Failed to configure password hasher")?;

    let policy = middleware::rate_limit_policy(&config.rate_limit)
        .context("Invalid rate limit configuration")?;
    middleware::spawn_purge_task(policy.clone(), config.rate_limit.window());

    let state = web::Data::new(AppState::new(
        Arc::new(SqliteStore::new(pool.clone())),
        hasher,
        config.feed.clone(),
        Notifier::start(config.notifications),
    ));
    let rate_limiter = middleware::rate_limiter(policy, &config.rate_limit);
    let cors_config = config.cors.clone();

    let bind_address = (config.app.host.clone(), config.app.port);
    info!("Listening on {}:{}", bind_address.0, bind_address.1);

    // Outermost first: tracing, CORS, rate limit, metrics, routes
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
            .wrap(MetricsMiddleware)
            .wrap(rate_limiter.clone())
            .wrap(routes::cors(&cors_config))
            .wrap(tracing_actix_web::TracingLogger::default())
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}:{}", bind_address.0, bind_address.1))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    pool.close().await;
    info!("{} stopped", SERVICE_NAME);
    Ok(())
}

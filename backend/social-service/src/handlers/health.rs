use crate::AppState;
use actix_web::{web, HttpResponse};

/// Liveness probe; never touches the store
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": crate::config::SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe: the store must answer a trivial query
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ready": true })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "ready": false }))
        }
    }
}

/// Prometheus text exposition
pub async fn metrics() -> HttpResponse {
    match actix_middleware::metrics::render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

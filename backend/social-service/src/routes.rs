/// Route table and CORS policy
use crate::config::CorsConfig;
use crate::error::AppError;
use crate::handlers::{health, notifications, posts, users};
use actix_cors::Cors;
use actix_web::{error, http::header, web, HttpRequest};

/// Register every endpoint together with JSON-shaped extractor errors
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .route("/metrics", web::get().to(health::metrics))
        .route("/", web::get().to(notifications::index))
        .route("/ws/", web::get().to(notifications::connect))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::liveness))
                .route("/health/ready", web::get().to(health::readiness))
                .service(
                    web::scope("/users")
                        .route("/register", web::post().to(users::register))
                        .route("/{username}", web::get().to(users::get_user)),
                )
                .service(
                    web::scope("/posts")
                        .route("/create", web::post().to(posts::create_post))
                        .route("/feed", web::get().to(posts::get_feed)),
                ),
        );
}

/// Cross-origin policy: listed origins only, GET/POST, credentials allowed
pub fn cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default();
    for origin in config.origins() {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::ORIGIN, header::CONTENT_TYPE])
        .expose_headers(vec![header::CONTENT_LENGTH])
        .supports_credentials()
        .max_age(3600)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        tracing::debug!(error = %err, "Rejected JSON payload");
        let message = match &err {
            error::JsonPayloadError::ContentType => {
                "Content-Type must be application/json".to_string()
            }
            other => format!("Invalid request body: {}", other),
        };
        AppError::BadRequest(message).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

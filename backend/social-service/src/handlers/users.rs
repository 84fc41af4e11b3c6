use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::models::{RegisterRequest, RegisterResponse};
use crate::AppState;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};
use validator::Validate;

pub const PROFILE_NOT_FOUND_MESSAGE: &str = "Profile not found";

/// Register a new user
///
/// The password is hashed on the blocking pool before the insert; only the
/// digest is stored.
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let hasher = state.hasher.clone();
    let password = req.password;
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let id = state
        .store
        .create_user(&req.username, &req.email, &password_hash)
        .await
        .map_err(|e| {
            if matches!(e, StoreError::Conflict) {
                warn!(username = %req.username, "Registration rejected: username or email taken");
            }
            AppError::from(e)
        })?;

    info!(user_id = id, username = %req.username, "User registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully",
        id,
    }))
}

/// Get a user's public profile
pub async fn get_user(
    state: web::Data<AppState>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let username = username.into_inner();

    match state.store.get_user_by_username(&username).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(StoreError::NotFound) => Err(AppError::NotFound(PROFILE_NOT_FOUND_MESSAGE.to_string())),
        Err(e) => Err(e.into()),
    }
}

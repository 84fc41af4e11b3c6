use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::models::{CreatePostRequest, CreatePostResponse, FeedQuery};
use crate::notifications::Notification;
use crate::validators::{
    parse_positive, validate_post_content, INVALID_LIMIT_MESSAGE, INVALID_PAGE_MESSAGE,
};
use crate::AppState;
use actix_web::{web, HttpResponse};
use tracing::{debug, info, warn};

/// Create a post for an existing user
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    validate_post_content(&req.content)?;

    let created = state
        .store
        .create_post(req.user_id, &req.content)
        .await
        .map_err(|e| {
            if matches!(e, StoreError::UnknownAuthor) {
                warn!(user_id = req.user_id, "Post rejected: author does not exist");
            }
            AppError::from(e)
        })?;

    info!(
        post_id = created.id,
        user_id = req.user_id,
        created_at = %created.created_at,
        "Post created"
    );

    state.notifications.publish(Notification::PostCreated {
        post_id: created.id,
        user_id: req.user_id,
        content: req.content.clone(),
        created_at: created.created_at,
    });

    Ok(HttpResponse::Created().json(CreatePostResponse {
        message: "Post created successfully",
        post_id: created.id,
        user_id: req.user_id,
        content: req.content,
    }))
}

/// Paginated feed of all posts, newest first
pub async fn get_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = parse_positive(query.page.as_deref(), 1, INVALID_PAGE_MESSAGE)?;
    let limit = parse_positive(
        query.limit.as_deref(),
        state.feed.default_page_size,
        INVALID_LIMIT_MESSAGE,
    )?;

    let posts = state.store.list_feed(page, limit).await?;
    debug!(page, limit, returned = posts.len(), "Feed page served");

    Ok(HttpResponse::Ok().json(posts))
}

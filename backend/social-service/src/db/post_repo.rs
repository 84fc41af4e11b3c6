use crate::models::{CreatedPost, FeedPost};
use sqlx::SqlitePool;

/// Rows to skip before the requested page, saturating instead of overflowing
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// Insert a post; the timestamp comes from SQLite at insert time
pub async fn create_post(
    pool: &SqlitePool,
    user_id: i64,
    content: &str,
) -> Result<CreatedPost, sqlx::Error> {
    sqlx::query_as::<_, CreatedPost>(
        r#"
        INSERT INTO posts (user_id, content, created_at)
        VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        RETURNING id, created_at
        "#,
    )
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// One page of posts joined with author usernames, newest first
///
/// Ties on `created_at` fall back to the higher id first so page boundaries
/// are stable for an unchanging dataset.
pub async fn list_feed(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    sqlx::query_as::<_, FeedPost>(
        r#"
        SELECT p.id, p.user_id, p.content, p.created_at, u.username
        FROM posts p
        INNER JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(5, 3), 12);
    }

    #[test]
    fn test_page_offset_saturates() {
        assert_eq!(page_offset(i64::MAX, i64::MAX), i64::MAX);
    }
}

use axum::{extract::State, response::IntoResponse};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    auth::jwt,
    comments::{CommentFilter, CommentResponse, CreateComment},
    entries::visibility::ensure_readable,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
    store::SharedStore,
    users::AuthorResponse,
};

/// Helper struct for fetching comments with author info from database
#[derive(FromRow)]
struct CommentFromDb {
    id: Uuid,
    entry_id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
    // Author fields
    name: String,
    image: Option<String>,
}

impl From<CommentFromDb> for CommentResponse {
    fn from(c: CommentFromDb) -> Self {
        CommentResponse {
            id: c.id,
            entry_id: c.entry_id,
            author: AuthorResponse {
                id: c.user_id,
                name: c.name,
                image: c.image,
            },
            content: c.content,
            created_at: c.created_at,
        }
    }
}

/// Comment on an entry the caller can read
/// POST /api/comments
pub async fn create_comment(
    State(pool): State<PgPool>,
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<CreateComment>,
) -> Result<impl IntoResponse, AppError> {
    let (entry_id, content) = payload.parts()?;

    ensure_readable(store.as_ref(), claims.sub, entry_id).await?;

    let comment = sqlx::query_as::<_, CommentFromDb>(
        r#"
        WITH inserted AS (
            INSERT INTO comments (entry_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
        )
        SELECT i.id, i.entry_id, i.user_id, i.content, i.created_at, u.name, u.image
        FROM inserted i
        JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(entry_id)
    .bind(claims.sub)
    .bind(content)
    .fetch_one(&pool)
    .await
    // The entry can be deleted between the read check and the insert
    .map_err(|e| AppError::db_missing(e, "Entry not found"))?;

    Ok(ApiResponse::success(CommentResponse::from(comment)).created())
}

/// Comments on an entry, oldest first
/// GET /api/comments?entry_id=
pub async fn list_comments(
    State(pool): State<PgPool>,
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(filter): AppQuery<CommentFilter>,
) -> Result<impl IntoResponse, AppError> {
    let entry_id = filter
        .entry_id
        .ok_or(AppError::BadRequest("entry_id is required".to_string()))?;

    ensure_readable(store.as_ref(), claims.sub, entry_id).await?;

    let comments = sqlx::query_as::<_, CommentFromDb>(
        r#"
        SELECT c.id, c.entry_id, c.user_id, c.content, c.created_at, u.name, u.image
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.entry_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(entry_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch comments: {:?}", e);
        AppError::InternalServerError
    })?;

    let response: Vec<CommentResponse> = comments.into_iter().map(CommentResponse::from).collect();

    Ok(ApiResponse::success(response))
}

/// Delete a comment (author only)
/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(comment_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // Someone else's comment is reported exactly like a missing one
    let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(claims.sub)
        .execute(&pool)
        .await
        .map_err(AppError::db)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    Ok(ApiResponse::ok("Comment deleted".to_string()))
}

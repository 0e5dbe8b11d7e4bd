use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::jwt,
    bookmarks::{Bookmark, BookmarkFilter, CreateBookmark, UpdateBookmark},
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
};

/// List the caller's bookmarks, optionally searching url, title and notes
/// GET /api/bookmarks?search=
pub async fn list_bookmarks(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppQuery(filter): AppQuery<BookmarkFilter>,
) -> Result<impl IntoResponse, AppError> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let bookmarks = sqlx::query_as::<_, Bookmark>(
        r#"
        SELECT * FROM bookmarks
        WHERE user_id = $1
          AND (
              $2::text IS NULL
              OR url ILIKE '%' || $2 || '%'
              OR title ILIKE '%' || $2 || '%'
              OR notes ILIKE '%' || $2 || '%'
          )
        ORDER BY created_at DESC
        "#,
    )
    .bind(claims.sub)
    .bind(search)
    .fetch_all(&pool)
    .await
    .map_err(AppError::db)?;

    Ok(ApiResponse::success(bookmarks))
}

/// POST /api/bookmarks
pub async fn create_bookmark(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<CreateBookmark>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bookmark = sqlx::query_as::<_, Bookmark>(
        r#"
        INSERT INTO bookmarks (user_id, url, title, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(claims.sub)
    .bind(&payload.url)
    .bind(&payload.title)
    .bind(&payload.notes)
    .fetch_one(&pool)
    .await
    .map_err(AppError::db)?;

    Ok(ApiResponse::success(bookmark).created())
}

/// PUT /api/bookmarks/:id
pub async fn update_bookmark(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateBookmark>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bookmark = sqlx::query_as::<_, Bookmark>(
        r#"
        UPDATE bookmarks
        SET url = COALESCE($1, url),
            title = CASE WHEN $2 THEN $3 ELSE title END,
            notes = CASE WHEN $4 THEN $5 ELSE notes END,
            updated_at = NOW()
        WHERE id = $6 AND user_id = $7
        RETURNING *
        "#,
    )
    .bind(&payload.url)
    .bind(payload.title.is_some())
    .bind(payload.title.flatten())
    .bind(payload.notes.is_some())
    .bind(payload.notes.flatten())
    .bind(id)
    .bind(claims.sub)
    .fetch_optional(&pool)
    .await
    .map_err(AppError::db)?
    .ok_or(AppError::NotFound("Bookmark not found".to_string()))?;

    Ok(ApiResponse::success(bookmark))
}

/// DELETE /api/bookmarks/:id
pub async fn delete_bookmark(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(claims.sub)
        .execute(&pool)
        .await
        .map_err(AppError::db)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Bookmark not found".to_string()));
    }

    Ok(ApiResponse::ok("Bookmark deleted".to_string()))
}

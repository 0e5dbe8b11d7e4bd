use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::jwt,
    entries::{
        visibility::{self, DEFAULT_FEED_DAYS},
        CreateEntry, Entry, EntryQuery, FeedQuery, UpdateEntry,
    },
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
    store::SharedStore,
};

/// Create a journal entry
/// POST /api/entries
pub async fn create_entry(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<CreateEntry>,
) -> Result<impl IntoResponse, AppError> {
    let content = payload
        .content
        .filter(|c| !c.is_null())
        .ok_or(AppError::BadRequest("content is required".to_string()))?;

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (user_id, content, visibility)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(claims.sub)
    .bind(&content)
    .bind(payload.visibility.unwrap_or_default())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create entry: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(ApiResponse::success(entry).created())
}

/// List a user's entries as seen by the caller
/// GET /api/entries?user_id=&visibility=&days=&order=
pub async fn list_entries(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<EntryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let target_id = query.user_id.unwrap_or(claims.sub);

    let entries = visibility::list_visible_entries(
        store.as_ref(),
        claims.sub,
        target_id,
        query.visibility,
        query.days,
        query.order.unwrap_or_default(),
    )
    .await?;

    Ok(ApiResponse::success(entries))
}

/// Get a single entry
/// GET /api/entries/:id
pub async fn get_entry(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entry = visibility::ensure_readable(store.as_ref(), claims.sub, id).await?;
    Ok(ApiResponse::success(entry))
}

/// Update an entry (owner only)
/// PUT /api/entries/:id
pub async fn update_entry(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateEntry>,
) -> Result<impl IntoResponse, AppError> {
    if matches!(payload.content, Some(serde_json::Value::Null)) {
        return Err(AppError::BadRequest("content must not be null".to_string()));
    }

    // Ownership is part of the WHERE clause; a foreign entry looks missing
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries
        SET content = COALESCE($1, content),
            visibility = COALESCE($2, visibility),
            updated_at = NOW()
        WHERE id = $3 AND user_id = $4
        RETURNING *
        "#,
    )
    .bind(&payload.content)
    .bind(payload.visibility)
    .bind(id)
    .bind(claims.sub)
    .fetch_optional(&pool)
    .await
    .map_err(AppError::db)?
    .ok_or(AppError::NotFound("Entry not found".to_string()))?;

    Ok(ApiResponse::success(entry))
}

/// Delete an entry (owner only)
/// DELETE /api/entries/:id
pub async fn delete_entry(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(claims.sub)
        .execute(&pool)
        .await
        .map_err(AppError::db)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Entry not found".to_string()));
    }

    Ok(ApiResponse::ok("Entry deleted".to_string()))
}

/// Entries from everyone the caller follows
/// GET /api/feed?days=
pub async fn get_feed(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let days = query.days.unwrap_or(DEFAULT_FEED_DAYS);
    let feed = visibility::build_feed(store.as_ref(), claims.sub, days).await?;

    Ok(ApiResponse::success(feed))
}

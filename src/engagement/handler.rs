use axum::{extract::State, response::IntoResponse};

use crate::{
    auth::jwt,
    engagement::{service, EntryRef, MembershipKind},
    error::AppError,
    extract::{AppJson, AppQuery},
    response::ApiResponse,
    store::SharedStore,
};

/// Like an entry the caller can read
/// POST /api/likes
pub async fn like_entry(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<EntryRef>,
) -> Result<impl IntoResponse, AppError> {
    let entry_id = payload.require()?;
    let like =
        service::mark_entry(store.as_ref(), MembershipKind::Like, claims.sub, entry_id).await?;

    Ok(ApiResponse::success(like).created())
}

/// Remove a like; succeeds when there is none
/// DELETE /api/likes?entry_id=
pub async fn unlike_entry(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<EntryRef>,
) -> Result<impl IntoResponse, AppError> {
    let entry_id = query.require()?;
    service::unmark_entry(store.as_ref(), MembershipKind::Like, claims.sub, entry_id).await?;

    Ok(ApiResponse::ok("Like removed".to_string()))
}

/// Save an entry the caller can read
/// POST /api/saved
pub async fn save_entry(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<EntryRef>,
) -> Result<impl IntoResponse, AppError> {
    let entry_id = payload.require()?;
    let saved =
        service::mark_entry(store.as_ref(), MembershipKind::Save, claims.sub, entry_id).await?;

    Ok(ApiResponse::success(saved).created())
}

/// Remove a saved entry; succeeds when there is none
/// DELETE /api/saved?entry_id=
pub async fn unsave_entry(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<EntryRef>,
) -> Result<impl IntoResponse, AppError> {
    let entry_id = query.require()?;
    service::unmark_entry(store.as_ref(), MembershipKind::Save, claims.sub, entry_id).await?;

    Ok(ApiResponse::ok("Entry unsaved".to_string()))
}

/// The caller's saved entries that are still readable, newest save first
/// GET /api/saved
pub async fn list_saved(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let saved = service::list_saved(store.as_ref(), claims.sub).await?;

    Ok(ApiResponse::success(saved))
}

use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::{
    auth::jwt,
    error::AppError,
    extract::{AppJson, AppQuery},
    follows::{
        service, CreateFollow, FollowListQuery, FollowResponse, FollowView, RespondToFollow,
        UnfollowQuery,
    },
    response::ApiResponse,
    store::SharedStore,
};

/// Send a follow request (auto-accepted for public accounts)
/// POST /api/follow
pub async fn follow_user(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<CreateFollow>,
) -> Result<impl IntoResponse, AppError> {
    let followee_id = payload
        .followee_id
        .ok_or(AppError::BadRequest("followee_id is required".to_string()))?;

    let follow = service::request_follow(store.as_ref(), claims.sub, followee_id).await?;

    Ok(ApiResponse::success(follow).created())
}

/// Accept or reject a follow request addressed to the caller
/// PATCH /api/follow
pub async fn respond_to_follow(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<RespondToFollow>,
) -> Result<impl IntoResponse, AppError> {
    let follow_id = payload
        .follow_id
        .ok_or(AppError::BadRequest("follow_id is required".to_string()))?;
    let action = payload.action.ok_or(AppError::BadRequest(
        "action is required (accept or reject)".to_string(),
    ))?;

    let outcome =
        service::respond_to_request(store.as_ref(), claims.sub, follow_id, action).await?;

    let body = match outcome {
        FollowResponse::Accepted(follow) => json!(follow),
        FollowResponse::Rejected { follow_id } => {
            json!({ "follow_id": follow_id, "action": "rejected" })
        }
    };

    Ok(ApiResponse::success(body))
}

/// Unfollow a user or cancel a pending request
/// DELETE /api/follow?target_id=
pub async fn unfollow_user(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<UnfollowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let target_id = query
        .target_id
        .ok_or(AppError::BadRequest("target_id is required".to_string()))?;

    service::unfollow(store.as_ref(), claims.sub, target_id).await?;

    Ok(ApiResponse::ok("Unfollowed".to_string()))
}

/// Incoming requests, followers or following of the caller
/// GET /api/follow?view=requests|followers|following
pub async fn list_follows(
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<FollowListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let view: FollowView = query
        .view
        .as_deref()
        .ok_or(AppError::BadRequest("view is required".to_string()))?
        .parse()?;

    let edges = match view {
        FollowView::Requests => service::list_pending_requests(store.as_ref(), claims.sub).await?,
        FollowView::Followers => service::list_followers(store.as_ref(), claims.sub).await?,
        FollowView::Following => service::list_following(store.as_ref(), claims.sub).await?,
    };

    Ok(ApiResponse::success(edges))
}

//! Follow-edge state machine.
//!
//! Per ordered pair the edge is absent, pending or accepted. A request to a public
//! account is accepted on creation; a request to a private account waits for the
//! followee. Only the followee answers a request, only the follower unfollows.

use uuid::Uuid;

use crate::{
    error::AppError,
    follows::{
        Follow, FollowAction, FollowEdge, FollowResponse, FollowStatus, FollowView, Relationship,
    },
    store::SocialStore,
};

pub async fn request_follow(
    store: &dyn SocialStore,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<Follow, AppError> {
    if follower_id == followee_id {
        return Err(AppError::BadRequest(
            "followee_id: cannot follow yourself".to_string(),
        ));
    }

    let followee = store
        .find_user(followee_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if store.find_follow(follower_id, followee_id).await?.is_some() {
        return Err(AppError::Conflict(
            "Already following or request pending".to_string(),
        ));
    }

    let status = if followee.is_public {
        FollowStatus::Accepted
    } else {
        FollowStatus::Pending
    };

    let follow = store.insert_follow(follower_id, followee_id, status).await?;

    tracing::info!(
        follow_id = %follow.id,
        %follower_id,
        %followee_id,
        status = ?follow.status,
        "follow created"
    );

    Ok(follow)
}

pub async fn respond_to_request(
    store: &dyn SocialStore,
    followee_id: Uuid,
    follow_id: Uuid,
    action: FollowAction,
) -> Result<FollowResponse, AppError> {
    // A request belongs to whoever was asked; anyone else sees nothing
    let follow = store
        .find_follow_by_id(follow_id)
        .await?
        .filter(|f| f.following_id == followee_id)
        .ok_or(AppError::NotFound("Follow request not found".to_string()))?;

    match action {
        FollowAction::Accept => {
            if follow.status == FollowStatus::Accepted {
                return Ok(FollowResponse::Accepted(follow));
            }

            let updated = store
                .update_follow_status(follow.id, FollowStatus::Accepted)
                .await?
                .ok_or(AppError::NotFound("Follow request not found".to_string()))?;

            tracing::info!(%follow_id, follower_id = %updated.follower_id, "follow accepted");
            Ok(FollowResponse::Accepted(updated))
        }
        FollowAction::Reject => {
            // Removes the edge in any status, so an accepted follower can be dropped too
            store.delete_follow_by_id(follow.id).await?;

            tracing::info!(%follow_id, follower_id = %follow.follower_id, "follow rejected");
            Ok(FollowResponse::Rejected { follow_id })
        }
    }
}

/// Set difference, not a transition: a missing edge is success.
pub async fn unfollow(
    store: &dyn SocialStore,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<(), AppError> {
    if store.delete_follow(follower_id, followee_id).await? {
        tracing::info!(%follower_id, %followee_id, "unfollowed");
    }
    Ok(())
}

pub async fn relationship_of(
    store: &dyn SocialStore,
    viewer_id: Uuid,
    target_id: Uuid,
) -> Result<Relationship, AppError> {
    let edge = store.find_follow(viewer_id, target_id).await?;
    Ok(Relationship::from(edge.map(|f| f.status)))
}

pub async fn list_followers(
    store: &dyn SocialStore,
    user_id: Uuid,
) -> Result<Vec<FollowEdge>, AppError> {
    store.list_follows(user_id, FollowView::Followers).await
}

pub async fn list_following(
    store: &dyn SocialStore,
    user_id: Uuid,
) -> Result<Vec<FollowEdge>, AppError> {
    store.list_follows(user_id, FollowView::Following).await
}

pub async fn list_pending_requests(
    store: &dyn SocialStore,
    user_id: Uuid,
) -> Result<Vec<FollowEdge>, AppError> {
    store.list_follows(user_id, FollowView::Requests).await
}

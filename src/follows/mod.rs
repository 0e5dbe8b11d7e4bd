use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use std::str::FromStr;
use uuid::Uuid;

use crate::{error::AppError, users::UserSummary};

pub mod handler;
pub mod service;

/// Stored state of a follow edge. An absent edge is the third state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "follow_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    Pending,
    Accepted,
}

/// Database model for a directed follow edge
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub status: FollowStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// How a viewer relates to a target, read off the viewer → target edge.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    None,
    Pending,
    Accepted,
}

impl From<Option<FollowStatus>> for Relationship {
    fn from(status: Option<FollowStatus>) -> Self {
        match status {
            None => Relationship::None,
            Some(FollowStatus::Pending) => Relationship::Pending,
            Some(FollowStatus::Accepted) => Relationship::Accepted,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Accept,
    Reject,
}

/// Which edge list to read for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowView {
    /// Pending edges pointing at the user.
    Requests,
    /// Accepted edges pointing at the user.
    Followers,
    /// Accepted edges leaving the user.
    Following,
}

impl FollowView {
    pub fn status(self) -> FollowStatus {
        match self {
            FollowView::Requests => FollowStatus::Pending,
            FollowView::Followers | FollowView::Following => FollowStatus::Accepted,
        }
    }

    /// True when the listed user sits on the `following_id` side.
    pub fn is_inbound(self) -> bool {
        !matches!(self, FollowView::Following)
    }
}

impl FromStr for FollowView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requests" => Ok(FollowView::Requests),
            "followers" => Ok(FollowView::Followers),
            "following" => Ok(FollowView::Following),
            _ => Err(AppError::BadRequest(
                "view must be one of requests, followers, following".to_string(),
            )),
        }
    }
}

/// An edge joined with the profile of the user on the other end.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FollowEdge {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub status: FollowStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user: UserSummary,
}

/// Result of answering a follow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowResponse {
    Accepted(Follow),
    Rejected { follow_id: Uuid },
}

#[derive(Debug, Deserialize)]
pub struct CreateFollow {
    pub followee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RespondToFollow {
    pub follow_id: Option<Uuid>,
    pub action: Option<FollowAction>,
}

#[derive(Debug, Deserialize)]
pub struct UnfollowQuery {
    pub target_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    pub view: Option<String>,
}

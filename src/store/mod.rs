use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    engagement::{Membership, MembershipKind, SavedEntry},
    entries::{AuthoredEntry, Engagement, Entry, EntryFilter, Visibility},
    error::AppError,
    follows::{Follow, FollowEdge, FollowStatus, FollowView},
    users::UserSummary,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgSocialStore;

pub type SharedStore = Arc<dyn SocialStore>;

/// Datastore operations behind the relationship manager and the visibility resolver.
///
/// Implementations must enforce one edge per ordered `(follower, following)` pair and
/// report a duplicate insert as `AppError::Conflict`.
#[async_trait]
pub trait SocialStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserSummary>, AppError>;

    async fn find_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Follow>, AppError>;

    async fn find_follow_by_id(&self, id: Uuid) -> Result<Option<Follow>, AppError>;

    async fn insert_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        status: FollowStatus,
    ) -> Result<Follow, AppError>;

    async fn update_follow_status(
        &self,
        id: Uuid,
        status: FollowStatus,
    ) -> Result<Option<Follow>, AppError>;

    /// Returns whether an edge was removed.
    async fn delete_follow_by_id(&self, id: Uuid) -> Result<bool, AppError>;

    /// Returns whether an edge was removed.
    async fn delete_follow(&self, follower_id: Uuid, following_id: Uuid)
        -> Result<bool, AppError>;

    /// Edges for `user_id` in the given view, newest first.
    async fn list_follows(
        &self,
        user_id: Uuid,
        view: FollowView,
    ) -> Result<Vec<FollowEdge>, AppError>;

    /// Ids of users `follower_id` follows with an accepted edge.
    async fn accepted_following_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    async fn find_entry(&self, id: Uuid) -> Result<Option<Entry>, AppError>;

    async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, AppError>;

    /// Entries of any of `authors` in `visibilities`, created at or after `since`,
    /// newest first, at most `limit`.
    async fn list_feed_entries(
        &self,
        authors: &[Uuid],
        visibilities: &[Visibility],
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AuthoredEntry>, AppError>;

    /// Counts and viewer flags for each of `entry_ids`.
    async fn engagement(
        &self,
        viewer_id: Uuid,
        entry_ids: &[Uuid],
    ) -> Result<Vec<Engagement>, AppError>;

    /// Records a like or save. A duplicate is `Conflict`, a missing entry `NotFound`.
    async fn insert_membership(
        &self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Membership, AppError>;

    /// Returns whether a row was removed.
    async fn delete_membership(
        &self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Everything `user_id` has saved, with authors, newest save first.
    /// No read-access filtering happens here.
    async fn list_saved(&self, user_id: Uuid) -> Result<Vec<SavedEntry>, AppError>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    engagement::{Membership, MembershipKind, SavedEntry},
    entries::{AuthoredEntry, Engagement, Entry, EntryFilter, Visibility},
    error::AppError,
    follows::{Follow, FollowEdge, FollowStatus, FollowView},
    store::SocialStore,
    users::{AuthorResponse, UserSummary},
};

#[derive(Clone)]
pub struct PgSocialStore {
    pool: PgPool,
}

impl PgSocialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Helper struct for fetching an edge with the counterpart's profile
#[derive(FromRow)]
struct FollowEdgeRow {
    id: Uuid,
    follower_id: Uuid,
    following_id: Uuid,
    status: FollowStatus,
    created_at: DateTime<Utc>,
    user_id: Uuid,
    name: String,
    email: String,
    image: Option<String>,
    bio: Option<String>,
    is_public: bool,
}

impl From<FollowEdgeRow> for FollowEdge {
    fn from(r: FollowEdgeRow) -> Self {
        FollowEdge {
            id: r.id,
            follower_id: r.follower_id,
            following_id: r.following_id,
            status: r.status,
            created_at: r.created_at,
            user: UserSummary {
                id: r.user_id,
                name: r.name,
                email: r.email,
                image: r.image,
                bio: r.bio,
                is_public: r.is_public,
            },
        }
    }
}

/// Helper struct for fetching entries with author info
#[derive(FromRow)]
struct EntryWithAuthorRow {
    id: Uuid,
    user_id: Uuid,
    content: serde_json::Value,
    visibility: Visibility,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: String,
    author_image: Option<String>,
}

impl From<EntryWithAuthorRow> for AuthoredEntry {
    fn from(r: EntryWithAuthorRow) -> Self {
        AuthoredEntry {
            author: AuthorResponse {
                id: r.user_id,
                name: r.author_name,
                image: r.author_image,
            },
            entry: Entry {
                id: r.id,
                user_id: r.user_id,
                content: r.content,
                visibility: r.visibility,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
        }
    }
}

/// Helper struct for fetching a saved entry with its author
#[derive(FromRow)]
struct SavedEntryRow {
    saved_at: DateTime<Utc>,
    #[sqlx(flatten)]
    entry: EntryWithAuthorRow,
}

impl From<SavedEntryRow> for SavedEntry {
    fn from(r: SavedEntryRow) -> Self {
        SavedEntry {
            saved_at: r.saved_at,
            source: AuthoredEntry::from(r.entry),
        }
    }
}

fn visibility_names(visibilities: &[Visibility]) -> Vec<&'static str> {
    visibilities.iter().map(|v| v.as_str()).collect()
}

#[async_trait]
impl SocialStore for PgSocialStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserSummary>, AppError> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, image, bio, is_public FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::db)
    }

    async fn find_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<Follow>, AppError> {
        sqlx::query_as::<_, Follow>(
            "SELECT * FROM follows WHERE follower_id = $1 AND following_id = $2",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::db)
    }

    async fn find_follow_by_id(&self, id: Uuid) -> Result<Option<Follow>, AppError> {
        sqlx::query_as::<_, Follow>("SELECT * FROM follows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::db)
    }

    async fn insert_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
        status: FollowStatus,
    ) -> Result<Follow, AppError> {
        // A concurrent duplicate request loses on the unique key
        sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (follower_id, following_id, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::db_conflict(e, "Already following or request pending"))
    }

    async fn update_follow_status(
        &self,
        id: Uuid,
        status: FollowStatus,
    ) -> Result<Option<Follow>, AppError> {
        sqlx::query_as::<_, Follow>("UPDATE follows SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::db)
    }

    async fn delete_follow_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::db)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::db)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_follows(
        &self,
        user_id: Uuid,
        view: FollowView,
    ) -> Result<Vec<FollowEdge>, AppError> {
        // Inbound views list the follower, outbound views list the followee
        let (match_column, join_column) = if view.is_inbound() {
            ("following_id", "follower_id")
        } else {
            ("follower_id", "following_id")
        };

        let query_str = format!(
            r#"
            SELECT
                f.id, f.follower_id, f.following_id, f.status, f.created_at,
                u.id AS user_id, u.name, u.email, u.image, u.bio, u.is_public
            FROM follows f
            JOIN users u ON u.id = f.{join_column}
            WHERE f.{match_column} = $1 AND f.status = $2
            ORDER BY f.created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, FollowEdgeRow>(&query_str)
            .bind(user_id)
            .bind(view.status())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::db)?;

        Ok(rows.into_iter().map(FollowEdge::from).collect())
    }

    async fn accepted_following_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT following_id FROM follows WHERE follower_id = $1 AND status = 'accepted'",
        )
        .bind(follower_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::db)
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<Entry>, AppError> {
        sqlx::query_as::<_, Entry>("SELECT * FROM entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::db)
    }

    async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, AppError> {
        let query_str = format!(
            r#"
            SELECT * FROM entries
            WHERE user_id = $1
              AND visibility::text = ANY($2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
            ORDER BY created_at {}
            "#,
            filter.order.as_sql()
        );

        sqlx::query_as::<_, Entry>(&query_str)
            .bind(filter.owner_id)
            .bind(visibility_names(&filter.visibilities))
            .bind(filter.since)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::db)
    }

    async fn list_feed_entries(
        &self,
        authors: &[Uuid],
        visibilities: &[Visibility],
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<AuthoredEntry>, AppError> {
        let rows = sqlx::query_as::<_, EntryWithAuthorRow>(
            r#"
            SELECT
                e.id, e.user_id, e.content, e.visibility, e.created_at, e.updated_at,
                u.name AS author_name, u.image AS author_image
            FROM entries e
            JOIN users u ON u.id = e.user_id
            WHERE e.user_id = ANY($1)
              AND e.visibility::text = ANY($2)
              AND e.created_at >= $3
            ORDER BY e.created_at DESC
            LIMIT $4
            "#,
        )
        .bind(authors)
        .bind(visibility_names(visibilities))
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Feed error: {:?}", e);
            AppError::InternalServerError
        })?;

        Ok(rows.into_iter().map(AuthoredEntry::from).collect())
    }

    async fn engagement(
        &self,
        viewer_id: Uuid,
        entry_ids: &[Uuid],
    ) -> Result<Vec<Engagement>, AppError> {
        sqlx::query_as::<_, Engagement>(
            r#"
            SELECT
                e.id AS entry_id,
                (SELECT COUNT(*) FROM likes l WHERE l.entry_id = e.id) AS likes_count,
                (SELECT COUNT(*) FROM comments c WHERE c.entry_id = e.id) AS comments_count,
                EXISTS (
                    SELECT 1 FROM likes l WHERE l.entry_id = e.id AND l.user_id = $1
                ) AS is_liked,
                EXISTS (
                    SELECT 1 FROM saved_entries s WHERE s.entry_id = e.id AND s.user_id = $1
                ) AS is_saved
            FROM entries e
            WHERE e.id = ANY($2)
            "#,
        )
        .bind(viewer_id)
        .bind(entry_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::db)
    }

    async fn insert_membership(
        &self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Membership, AppError> {
        let query_str = format!(
            "INSERT INTO {} (user_id, entry_id) VALUES ($1, $2) RETURNING *",
            kind.table()
        );

        sqlx::query_as::<_, Membership>(&query_str)
            .bind(user_id)
            .bind(entry_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::db_insert(e, kind.conflict_message(), "Entry not found"))
    }

    async fn delete_membership(
        &self,
        kind: MembershipKind,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<bool, AppError> {
        let query_str = format!(
            "DELETE FROM {} WHERE user_id = $1 AND entry_id = $2",
            kind.table()
        );

        let result = sqlx::query(&query_str)
            .bind(user_id)
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::db)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_saved(&self, user_id: Uuid) -> Result<Vec<SavedEntry>, AppError> {
        let rows = sqlx::query_as::<_, SavedEntryRow>(
            r#"
            SELECT
                s.created_at AS saved_at,
                e.id, e.user_id, e.content, e.visibility, e.created_at, e.updated_at,
                u.name AS author_name, u.image AS author_image
            FROM saved_entries s
            JOIN entries e ON e.id = s.entry_id
            JOIN users u ON u.id = e.user_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::db)?;

        Ok(rows.into_iter().map(SavedEntry::from).collect())
    }
}

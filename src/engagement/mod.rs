use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entries::{AuthoredEntry, Engagement, Entry},
    error::AppError,
    users::AuthorResponse,
};

pub mod handler;
pub mod service;

/// Membership row shared by likes and saved entries.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Which per-user mark on an entry; one row per `(user, entry)` for each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipKind {
    Like,
    Save,
}

impl MembershipKind {
    pub fn table(self) -> &'static str {
        match self {
            MembershipKind::Like => "likes",
            MembershipKind::Save => "saved_entries",
        }
    }

    pub fn conflict_message(self) -> &'static str {
        match self {
            MembershipKind::Like => "Already liked",
            MembershipKind::Save => "Already saved",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryRef {
    pub entry_id: Option<Uuid>,
}

impl EntryRef {
    pub fn require(&self) -> Result<Uuid, AppError> {
        self.entry_id
            .ok_or(AppError::BadRequest("entry_id is required".to_string()))
    }
}

/// A saved entry as stored, before the viewer's read access is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedEntry {
    pub saved_at: chrono::DateTime<chrono::Utc>,
    pub source: AuthoredEntry,
}

/// A saved entry with its author and engagement counts.
#[derive(Debug, Serialize)]
pub struct SavedEntryResponse {
    pub saved_at: chrono::DateTime<chrono::Utc>,
    pub entry: Entry,
    pub author: AuthorResponse,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
}

impl SavedEntryResponse {
    pub fn project(saved: SavedEntry, stats: Option<&Engagement>) -> Self {
        let stats = stats.cloned().unwrap_or_default();
        SavedEntryResponse {
            saved_at: saved.saved_at,
            entry: saved.source.entry,
            author: saved.source.author,
            likes_count: stats.likes_count,
            comments_count: stats.comments_count,
            is_liked: stats.is_liked,
        }
    }
}

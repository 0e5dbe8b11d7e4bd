use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

use crate::users::AuthorResponse;

pub mod handler;
pub mod visibility;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Rich-text document, stored as-is.
    pub content: serde_json::Value,
    pub visibility: Visibility,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "entry_visibility", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Friends,
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Private, Visibility::Friends, Visibility::Public];

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Friends => "friends",
            Visibility::Public => "public",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A resolved read of one owner's entries.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFilter {
    pub owner_id: Uuid,
    /// Readable visibilities; empty means nothing is readable.
    pub visibilities: Vec<Visibility>,
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    pub order: SortOrder,
}

/// Entry joined with its owner's author block.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredEntry {
    pub entry: Entry,
    pub author: AuthorResponse,
}

/// Per-viewer engagement numbers for one entry, computed at read time.
#[derive(Debug, Clone, Default, sqlx::FromRow, PartialEq, Eq)]
pub struct Engagement {
    pub entry_id: Uuid,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
    pub is_saved: bool,
}

/// Read-only view of an entry decorated for one viewer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub author: AuthorResponse,
    pub is_liked: bool,
    pub is_saved: bool,
    pub likes_count: i64,
    pub comments_count: i64,
}

impl FeedEntry {
    pub fn project(source: AuthoredEntry, engagement: Option<&Engagement>) -> Self {
        let engagement = engagement.cloned().unwrap_or_default();
        FeedEntry {
            entry: source.entry,
            author: source.author,
            is_liked: engagement.is_liked,
            is_saved: engagement.is_saved,
            likes_count: engagement.likes_count,
            comments_count: engagement.comments_count,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEntry {
    pub content: Option<serde_json::Value>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntry {
    pub content: Option<serde_json::Value>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub user_id: Option<Uuid>,
    pub visibility: Option<Visibility>,
    pub days: Option<i64>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub days: Option<i64>,
}

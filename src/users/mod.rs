use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::follows::Relationship;

pub mod handler;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub is_public: bool,
    pub theme: Theme,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "theme_preference", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// The fields of a user anyone signed in may see.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub is_public: bool,
}

/// Author block embedded in entries and comments.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq, Eq)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

/// The signed-in user's own account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub is_public: bool,
    pub theme: Theme,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        AccountResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            bio: user.bio,
            image: user.image,
            is_public: user.is_public,
            theme: user.theme,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AccountCounts {
    pub entries: i64,
    pub bookmarks: i64,
    pub followers: i64,
    pub following: i64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub counts: AccountCounts,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProfileCounts {
    pub public_entries: i64,
    pub followers: i64,
    pub following: i64,
}

/// Another user's profile as seen by the viewer.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub counts: ProfileCounts,
    pub follow_status: Relationship,
    pub is_following: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(custom(
        function = "validate_display_name",
        message = "name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,
    /// Absent leaves the bio alone, `null` clears it.
    #[serde(default, deserialize_with = "crate::extract::nullable")]
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub theme: Option<Theme>,
}

/// Names are stored trimmed, so the bounds apply to the trimmed text.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if (1..=100).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("name"))
    }
}

#[derive(Debug, Deserialize)]
pub struct UserSearch {
    pub search: Option<String>,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, users::AuthorResponse};

pub mod handler;

const MAX_COMMENT_CHARS: usize = 5000;

/// Request payload for creating a comment
#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub entry_id: Option<Uuid>,
    pub content: Option<String>,
}

impl CreateComment {
    /// Entry id and trimmed content; the length limit applies to what is stored.
    pub fn parts(&self) -> Result<(Uuid, &str), AppError> {
        let entry_id = self
            .entry_id
            .ok_or(AppError::BadRequest("entry_id is required".to_string()))?;
        let content = self
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AppError::BadRequest("content is required".to_string()))?;
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::BadRequest(format!(
                "content must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }
        Ok((entry_id, content))
    }
}

/// Comment with author info
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub author: AuthorResponse,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CommentFilter {
    pub entry_id: Option<Uuid>,
}

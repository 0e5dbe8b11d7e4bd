use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub mod handler;

/// A saved reference link, private to its owner
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookmark {
    #[validate(url(message = "url: invalid URL"))]
    pub url: String,
    #[validate(length(max = 300, message = "title must be at most 300 characters"))]
    pub title: Option<String>,
    pub notes: Option<String>,
}

/// `title` and `notes` are cleared by an explicit `null` and kept when absent.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookmark {
    #[validate(url(message = "url: invalid URL"))]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "crate::extract::nullable")]
    #[validate(length(max = 300, message = "title must be at most 300 characters"))]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::extract::nullable")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct BookmarkFilter {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookmark_requires_a_url() {
        let bad = CreateBookmark {
            url: "not a url".into(),
            title: None,
            notes: None,
        };
        assert!(bad.validate().is_err());

        let good = CreateBookmark {
            url: "https://doc.rust-lang.org/book/".into(),
            title: Some("The Book".into()),
            notes: None,
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn partial_update_skips_missing_url() {
        let patch = UpdateBookmark {
            url: None,
            title: None,
            notes: Some(Some("chapter 10".into())),
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn null_clears_notes_but_absent_title_is_kept() {
        let patch: UpdateBookmark = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        assert_eq!(patch.notes, Some(None));
        assert_eq!(patch.title, None);
        assert!(patch.validate().is_ok());

        let long_title = UpdateBookmark {
            url: None,
            title: Some(Some("t".repeat(301))),
            notes: None,
        };
        assert!(long_title.validate().is_err());
    }
}

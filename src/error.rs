use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    InternalServerError,
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
}

impl AppError {
    /// Logs a datastore failure and hides it behind a 500.
    pub fn db(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::InternalServerError
    }

    /// Like [`AppError::db`], but a unique constraint violation becomes a `Conflict`.
    pub fn db_conflict(err: sqlx::Error, message: &str) -> Self {
        if is_unique_violation(&err) {
            AppError::Conflict(message.to_string())
        } else {
            AppError::db(err)
        }
    }

    /// A foreign key violation means the referenced row is gone; report it as `NotFound`.
    pub fn db_missing(err: sqlx::Error, message: &str) -> Self {
        if is_foreign_key_violation(&err) {
            AppError::NotFound(message.to_string())
        } else {
            AppError::db(err)
        }
    }

    /// Insert of a membership row: duplicates conflict, a vanished parent is `NotFound`.
    pub fn db_insert(err: sqlx::Error, conflict: &str, missing: &str) -> Self {
        if is_unique_violation(&err) {
            AppError::Conflict(conflict.to_string())
        } else {
            AppError::db_missing(err, missing)
        }
    }

    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        // Same envelope as ApiResponse, with no data
        let body = Json(json!({
            "success": false,
            "message": error_message,
            "data": null
        }));

        (status, body).into_response()
    }
}

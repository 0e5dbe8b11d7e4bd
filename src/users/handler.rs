use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::jwt,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    follows::{service::relationship_of, Relationship},
    response::ApiResponse,
    store::SharedStore,
    users::{
        AccountCounts, AccountResponse, MeResponse, ProfileCounts, ProfileResponse,
        UpdateProfile, User, UserSearch, UserSummary,
    },
};

const SEARCH_LIMIT: i64 = 20;

async fn fetch_user(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::db)?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Current user's account with counts
/// GET /api/users/me
pub async fn get_me(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, claims.sub).await?;

    let counts = sqlx::query_as::<_, AccountCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM entries WHERE user_id = $1) AS entries,
            (SELECT COUNT(*) FROM bookmarks WHERE user_id = $1) AS bookmarks,
            (SELECT COUNT(*) FROM follows WHERE following_id = $1 AND status = 'accepted') AS followers,
            (SELECT COUNT(*) FROM follows WHERE follower_id = $1 AND status = 'accepted') AS following
        "#,
    )
    .bind(claims.sub)
    .fetch_one(&pool)
    .await
    .map_err(AppError::db)?;

    Ok(ApiResponse::success(MeResponse {
        account: AccountResponse::from(user),
        counts,
    }))
}

/// Update the current user's profile
/// PATCH /api/users/me
pub async fn update_me(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<UpdateProfile>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = COALESCE($1, name),
            bio = CASE WHEN $2 THEN $3 ELSE bio END,
            is_public = COALESCE($4, is_public),
            theme = COALESCE($5, theme),
            updated_at = NOW()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.bio.is_some())
    .bind(payload.bio.flatten())
    .bind(payload.is_public)
    .bind(payload.theme)
    .bind(claims.sub)
    .fetch_optional(&pool)
    .await
    .map_err(AppError::db)?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    if let Some(is_public) = payload.is_public {
        tracing::info!(user_id = %user.id, is_public, "account visibility changed");
    }

    Ok(ApiResponse::success(AccountResponse::from(user)))
}

/// Another user's profile, with the caller's follow status
/// GET /api/users/:id
pub async fn get_user_profile(
    State(pool): State<PgPool>,
    State(store): State<SharedStore>,
    claims: jwt::Claims,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, user_id).await?;

    let counts = sqlx::query_as::<_, ProfileCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM entries WHERE user_id = $1 AND visibility = 'public') AS public_entries,
            (SELECT COUNT(*) FROM follows WHERE following_id = $1 AND status = 'accepted') AS followers,
            (SELECT COUNT(*) FROM follows WHERE follower_id = $1 AND status = 'accepted') AS following
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .map_err(AppError::db)?;

    let follow_status = relationship_of(store.as_ref(), claims.sub, user_id).await?;

    Ok(ApiResponse::success(ProfileResponse {
        created_at: user.created_at,
        user: UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
            bio: user.bio,
            is_public: user.is_public,
        },
        counts,
        is_following: follow_status == Relationship::Accepted,
        follow_status,
    }))
}

/// Search other users by name or email
/// GET /api/users?search=
pub async fn search_users(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppQuery(query): AppQuery<UserSearch>,
) -> Result<impl IntoResponse, AppError> {
    let term = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::BadRequest("search is required".to_string()))?;

    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, name, email, image, bio, is_public
        FROM users
        WHERE id <> $1
          AND (name ILIKE '%' || $2 || '%' OR email ILIKE '%' || $2 || '%')
        ORDER BY name ASC
        LIMIT $3
        "#,
    )
    .bind(claims.sub)
    .bind(term)
    .bind(SEARCH_LIMIT)
    .fetch_all(&pool)
    .await
    .map_err(AppError::db)?;

    Ok(ApiResponse::success(users))
}

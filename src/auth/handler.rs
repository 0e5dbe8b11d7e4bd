use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{jwt, utils, AuthResponse, LoginUser, RegisterUser},
    config::settings::Settings,
    error::AppError,
    extract::AppJson,
    response::ApiResponse,
    users::{AccountResponse, User},
};

/// Credential sign-up
/// POST /api/auth/sign-up
pub async fn signup(
    State(pool): State<PgPool>,
    State(settings): State<Settings>,
    AppJson(payload): AppJson<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let password_hash =
        utils::hash_password(&payload.password).map_err(|_| AppError::InternalServerError)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(payload.name.trim())
    .bind(payload.email.to_lowercase())
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e| AppError::db_conflict(e, "Email already exists"))?;

    tracing::info!(user_id = %user.id, "user registered");

    let token = jwt::create_token(user.id, &settings.jwt_secret, settings.jwt_ttl_hours)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: AccountResponse::from(user),
    })
    .created())
}

/// Credential sign-in
/// POST /api/auth/sign-in
pub async fn login(
    State(pool): State<PgPool>,
    State(settings): State<Settings>,
    AppJson(payload): AppJson<LoginUser>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(payload.email.to_lowercase())
        .fetch_optional(&pool)
        .await
        .map_err(AppError::db)?
        .ok_or(AppError::Unauthorized)?;

    utils::verify_password(&user.password_hash, &payload.password)
        .map_err(|_| AppError::Unauthorized)?;

    let token = jwt::create_token(user.id, &settings.jwt_secret, settings.jwt_ttl_hours)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: AccountResponse::from(user),
    }))
}

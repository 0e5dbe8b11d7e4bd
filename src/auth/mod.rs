use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::users::AccountResponse;

pub mod handler;
pub mod jwt;
pub mod utils;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(custom(
        function = "crate::users::validate_display_name",
        message = "name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(email(message = "email: invalid format"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email(message = "email: invalid format"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountResponse,
}

//! Authentication-related response bodies

use serde::Serialize;

use super::user::UserResponse;

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Current session
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub user: UserResponse,
}

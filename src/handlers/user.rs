//! 用户管理的 HTTP 处理器
//! 所有响应都使用公开视图，不含密码哈希

use crate::{error::AppError, middleware::AppState, models::user::*};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

const USER: &str = "User";

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserResponse> = state
        .repos
        .users
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    let user = state
        .repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(USER))?;

    Ok(Json(UserResponse::from(user)))
}

/// 更新用户名或邮箱（密码不可通过此接口修改）
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let user = state
        .repos
        .users
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found(USER))?;

    tracing::info!(user_id = id, "User updated");

    Ok(Json(UserResponse::from(user)))
}

/// 删除用户
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    if !state.repos.users.delete(id).await? {
        return Err(AppError::not_found(USER));
    }

    tracing::info!(user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

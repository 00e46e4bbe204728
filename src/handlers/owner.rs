//! 负责人（Owner）管理的 HTTP 处理器

use crate::{error::AppError, middleware::AppState, models::owner::*};
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

const OWNER: &str = "Owner";

/// 创建负责人
pub async fn create_owner(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOwnerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let owner = state.repos.owners.create(&req).await?;

    tracing::info!(owner_id = owner.id, "Owner created");

    Ok((StatusCode::CREATED, Json(owner)))
}

/// 列出负责人
pub async fn list_owners(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let owners = state.repos.owners.list().await?;

    Ok(Json(owners))
}

/// 获取负责人详情
pub async fn get_owner(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    let owner = state
        .repos
        .owners
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(OWNER))?;

    Ok(Json(owner))
}

/// 更新负责人（只修改请求中出现的字段）
pub async fn update_owner(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateOwnerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let owner = state
        .repos
        .owners
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found(OWNER))?;

    Ok(Json(owner))
}

/// 删除负责人
pub async fn delete_owner(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    if !state.repos.owners.delete(id).await? {
        return Err(AppError::not_found(OWNER));
    }

    tracing::info!(owner_id = id, "Owner deleted");

    Ok(StatusCode::NO_CONTENT)
}

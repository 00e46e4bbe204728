//! 产品管理的 HTTP 处理器

use crate::{error::AppError, middleware::AppState, models::product::*};
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

const PRODUCT: &str = "Product";

/// 创建产品
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let product = state.repos.products.create(&req).await?;

    tracing::info!(product_id = product.product_id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// 列出产品
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let products = state.repos.products.list().await?;

    Ok(Json(products))
}

/// 获取产品详情
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    let product = state
        .repos
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT))?;

    Ok(Json(product))
}

/// 更新产品
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let product = state
        .repos
        .products
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT))?;

    Ok(Json(product))
}

/// 删除产品
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    if !state.repos.products.delete(id).await? {
        return Err(AppError::not_found(PRODUCT));
    }

    tracing::info!(product_id = id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

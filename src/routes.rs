//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::{
    auth::{api_key_middleware, jwt_auth_middleware},
    handlers,
    middleware::{request_tracking_middleware, AppState},
};

/// 请求体上限 1 MiB
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（欢迎页、健康检查、注册登录）
    let public_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    // 当前用户信息始终要求 JWT
    let session_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    // 资源路由，按 auth_mode 选择 JWT 或 API Key
    // 认证层用 route_layer 挂载，未匹配的路径仍返回 404
    let resource_routes = Router::new()
        .route(
            "/owners",
            get(handlers::owner::list_owners).post(handlers::owner::create_owner),
        )
        .route(
            "/owners/{id}",
            get(handlers::owner::get_owner)
                .put(handlers::owner::update_owner)
                .delete(handlers::owner::delete_owner),
        )
        .route(
            "/products",
            get(handlers::product::list_products).post(handlers::product::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        )
        .route("/users", get(handlers::user::list_users))
        .route(
            "/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        );

    let resource_routes = match &state.api_key {
        Some(verifier) => resource_routes.route_layer(axum::middleware::from_fn_with_state(
            verifier.clone(),
            api_key_middleware,
        )),
        None => resource_routes.route_layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        )),
    };

    tracing::debug!(auth_mode = ?state.config.security.auth_mode, "Routes registered");

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(resource_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_tracking_middleware))
                .layer(CorsLayer::permissive()),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

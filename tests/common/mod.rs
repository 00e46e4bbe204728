//! 测试公共模块
//! 基于内存存储构建完整路由，通过 oneshot 驱动请求

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use catalog_api::{
    config::{
        AppConfig, AuthMode, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
        StorageBackend,
    },
    middleware::AppState,
    repository::Repositories,
    routes,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";
pub const TEST_API_KEY: &str = "test-static-api-key";

/// 创建测试配置（内存存储，JWT 模式）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            token_ttl_secs: 86400,
            auth_mode: AuthMode::Jwt,
            api_key: None,
        },
    }
}

/// API Key 模式的测试配置
pub fn create_api_key_config() -> AppConfig {
    let mut config = create_test_config();
    config.security.auth_mode = AuthMode::ApiKey;
    config.security.api_key = Some(Secret::new(TEST_API_KEY.to_string()));
    config
}

/// 按配置构建应用
pub fn create_app(config: AppConfig) -> Router {
    let state = AppState::new(config, Repositories::in_memory(), None)
        .expect("Failed to build test app state");
    routes::create_router(Arc::new(state))
}

pub fn create_test_app() -> Router {
    create_app(create_test_config())
}

/// 测试响应
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is not UTF-8")
    }
}

/// 发送请求，附带任意请求头
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Body>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let response = app
        .clone()
        .oneshot(builder.body(body.unwrap_or_else(Body::empty)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}

/// 发送 JSON 请求，可选携带 Bearer 令牌
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> TestResponse {
    let auth = token.map(|t| format!("Bearer {}", t));
    let headers: Vec<(&str, &str)> = auth
        .as_deref()
        .map(|v| vec![("authorization", v)])
        .unwrap_or_default();

    send_raw(
        app,
        method,
        uri,
        body.map(|b| Body::from(b.to_string())),
        &headers,
    )
    .await
}

/// 注册用户并返回 (user_id, token)
pub async fn register_user(app: &Router, username: &str, email: &str, password: &str) -> (i64, String) {
    let response = send(
        app,
        Method::POST,
        "/auth/register",
        Some(json!({"username": username, "email": email, "password": password})),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());

    let json = response.json();
    (
        json["user"]["id"].as_i64().unwrap(),
        json["token"].as_str().unwrap().to_string(),
    )
}

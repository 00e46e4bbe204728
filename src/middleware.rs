//! HTTP 中间件
//! 应用状态与请求追踪

use crate::{
    auth::{ApiKeyVerifier, JwtService},
    config::{AppConfig, AuthMode},
    error::AppError,
    repository::Repositories,
    services::AuthService,
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

const TRACE_ID_HEADER: &str = "x-trace-id";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// 应用状态
///
/// 启动时构建一次，之后只读；各请求通过 Arc 共享
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repos: Repositories,
    /// 仅 postgres 后端存在，用于就绪探针
    pub db: Option<PgPool>,
    pub auth_service: Arc<AuthService>,
    pub jwt_service: Arc<JwtService>,
    /// 仅 auth_mode = api_key 时存在
    pub api_key: Option<Arc<ApiKeyVerifier>>,
}

impl AppState {
    /// 从配置和已选定的存储构建状态，密钥缺失时返回配置错误
    pub fn new(
        config: AppConfig,
        repos: Repositories,
        db: Option<PgPool>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let auth_service = Arc::new(AuthService::new(repos.users.clone(), jwt_service.clone()));

        let api_key = match config.security.auth_mode {
            AuthMode::ApiKey => Some(Arc::new(ApiKeyVerifier::from_config(&config)?)),
            AuthMode::Jwt => None,
        };

        Ok(Self {
            config,
            repos,
            db,
            auth_service,
            jwt_service,
            api_key,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method_label(method.as_str()),
            "status" => status_label(status)
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 回写追踪头；非法字符的 trace_id 直接丢弃
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert(TRACE_ID_HEADER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// 指标标签只使用静态字符串，避免基数爆炸
fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        _ => "OTHER",
    }
}

fn status_label(status: u16) -> &'static str {
    match status {
        200 => "200",
        201 => "201",
        204 => "204",
        400 => "400",
        401 => "401",
        404 => "404",
        409 => "409",
        500 => "500",
        _ => "other",
    }
}

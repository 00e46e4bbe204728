//! 健康检查处理器
//! 提供 /、/health 和 /ready 端点

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::{db, middleware::AppState};

const WELCOME: &str = "Welcome to the catalog API! Your API is up and running.";

/// 应用启动时间（在 main.rs 中设置）
static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 设置应用启动时间
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// 根路径欢迎语
pub async fn root() -> &'static str {
    WELCOME
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针
/// 检查存储后端，未就绪时返回 503
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let check = match &state.db {
        Some(pool) => match db::health_check(pool).await {
            db::HealthStatus::Healthy => HealthCheck {
                name: "database".to_string(),
                status: "healthy".to_string(),
                message: None,
            },
            db::HealthStatus::Unhealthy(msg) => HealthCheck {
                name: "database".to_string(),
                status: "unhealthy".to_string(),
                message: Some(msg),
            },
        },
        None => HealthCheck {
            name: "storage".to_string(),
            status: "healthy".to_string(),
            message: Some("in-memory".to_string()),
        },
    };

    let checks = vec![check];
    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}

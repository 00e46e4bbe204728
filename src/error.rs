//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// Postgres 唯一约束冲突错误码
const PG_UNIQUE_VIOLATION: &str = "23505";

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    MalformedInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authorization header is missing")]
    MissingCredential,

    #[error("Malformed authorization header")]
    MalformedCredential,

    #[error("Invalid token signature: {0}")]
    InvalidSignature(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Corrupt token claims: {0}")]
    CorruptClaims(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidSignature(_)
            | AppError::TokenExpired
            | AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::CorruptClaims(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::MalformedInput(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::MissingCredential => "Authorization header is missing".to_string(),
            AppError::MalformedCredential => {
                "Invalid Authorization header format. Expected 'Bearer <token>'".to_string()
            }
            AppError::InvalidSignature(_) => "Invalid token signature".to_string(),
            AppError::TokenExpired => "Token has expired".to_string(),
            AppError::CorruptClaims(_) => "User ID claim missing or invalid in token".to_string(),
            AppError::InvalidApiKey => "Invalid API key".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Server configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    // 便捷方法
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(what.to_string())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        AppError::MalformedInput(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// 将数据库唯一约束冲突映射为 Conflict，其余保持为数据库错误
    pub fn from_db_write(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                return AppError::Conflict(conflict_message.to_string());
            }
        }
        AppError::Database(err)
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 记录错误日志（响应体中不包含 request_id，保证相同错误的响应体一致）
        match &self {
            AppError::Config(_) => {
                tracing::error!(critical = true, code = self.code(), message = %self, "Server misconfiguration");
            }
            err if status.is_server_error() => {
                tracing::error!(code = self.code(), message = %err, "Application error");
            }
            err => {
                tracing::warn!(code = self.code(), message = %err, "Request rejected");
            }
        }

        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 请求体不是合法 JSON 或缺少字段
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}

/// 路径参数不是数字 ID
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedInput(rejection.body_text())
    }
}

/// 请求体字段校验失败
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::MalformedInput(e.to_string())
    }
}

//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use crate::auth::jwt::MAX_TOKEN_TTL_SECS;
use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 存储后端: postgres, memory
    pub backend: StorageBackend,
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Option<Secret<String>>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

/// 受保护路由的认证方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Bearer JWT（默认）
    Jwt,
    /// 静态 API Key
    ApiKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥（必填，无默认值）
    pub jwt_secret: Secret<String>,
    /// 会话令牌有效期（秒）
    pub token_ttl_secs: u64,
    /// 资源路由使用的认证方式
    pub auth_mode: AuthMode,
    /// 静态 API Key（auth_mode = api_key 时必填）
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置（jwt_secret 没有默认值）
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.backend", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", 86400)?
            .set_default("security.auth_mode", "jwt")?;

        // 从环境变量加载配置（前缀为 CATALOG_）
        settings = settings.add_source(
            Environment::with_prefix("CATALOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证数据库配置
        if self.database.backend == StorageBackend::Postgres {
            let has_url = self
                .database
                .url
                .as_ref()
                .is_some_and(|url| !url.expose_secret().trim().is_empty());
            if !has_url {
                return Err(ConfigError::Message(
                    "database.url is required for the postgres backend".to_string(),
                ));
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // JWT 密钥不能为空
        if self.security.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message("JWT secret must not be empty".to_string()));
        }

        // 有效期必须有上限，否则计算过期时间会溢出
        let ttl = self.security.token_ttl_secs;
        if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Message(format!(
                "token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        // API Key 模式必须配置密钥
        if self.security.auth_mode == AuthMode::ApiKey {
            let has_key = self
                .security
                .api_key
                .as_ref()
                .is_some_and(|key| !key.expose_secret().is_empty());
            if !has_key {
                return Err(ConfigError::Message(
                    "security.api_key is required when auth_mode = api_key".to_string(),
                ));
            }
        }

        Ok(())
    }
}

//! 日志与追踪系统
//! 根据 LoggingConfig 初始化结构化日志，RUST_LOG 优先

use crate::{config::LoggingConfig, error::AppError};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 初始化日志与追踪系统（进程内只能调用一次）
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let log_layer = match config.format.to_lowercase().as_str() {
        // 生产环境: 每个请求 span 结束时输出一行 JSON
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        // 开发环境
        _ => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("failed to install tracing subscriber: {}", e)))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "Telemetry initialized"
    );

    Ok(())
}

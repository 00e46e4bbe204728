//! 商品目录服务主入口

use catalog_api::{
    config::{AppConfig, StorageBackend},
    db,
    handlers::health,
    middleware::AppState,
    repository::Repositories,
    routes, telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-V" => {
                println!("catalog-api {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("未知参数: {}", other);
                print_help();
                std::process::exit(2);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("CATALOG_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置（密钥缺失等配置错误直接终止启动）
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "catalog-api starting...");

    // 3. 存储后端
    let (repos, db_pool) = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Database initialized");
            (Repositories::postgres(pool.clone()), Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };

    // 4. 构建应用状态与路由
    let state = AppState::new(config.clone(), repos, db_pool).map_err(|e| {
        tracing::error!(critical = true, error = %e, "Failed to build application state");
        anyhow::anyhow!("Failed to build application state: {}", e)
    })?;
    let app = routes::create_router(Arc::new(state));

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        auth_mode = ?config.security.auth_mode,
        "Server listening"
    );

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
/// 收到信号后开始排空连接，超时仍未结束则强制退出
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("catalog-api {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: catalog-api [选项]");
    println!();
    println!("选项:");
    println!("  -V, --version     打印版本信息并退出");
    println!("  -h, --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  CATALOG_SECURITY__JWT_SECRET    令牌签名密钥（必填）");
    println!("  CATALOG_DATABASE__BACKEND       postgres | memory（默认 postgres）");
    println!("  CATALOG_DATABASE__URL           PostgreSQL 连接串");
    println!("  CATALOG_SERVER__ADDR            监听地址（默认 0.0.0.0:3000）");
    println!("  CATALOG_SECURITY__AUTH_MODE     jwt | api_key（默认 jwt）");
    println!("  CATALOG_SECURITY__API_KEY       api_key 模式下的静态密钥");
    println!("  CATALOG_LOGGING__LEVEL          日志级别（默认 info）");
    println!("  CATALOG_LOGGING__FORMAT         json | pretty（默认 json）");
}

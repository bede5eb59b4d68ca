use backup_core::config::AppConfig;
use backup_server::{AppState, router, setup_logging};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// 数据库备份编排服务
#[derive(Parser)]
#[command(name = "backup-server")]
#[command(about = "数据库备份编排服务：接收批次请求并触发全量/增量备份")]
#[command(version)]
struct Cli {
    /// 配置文件路径（缺省时按约定文件名就近查找）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ 加载配置失败: {}", e);
            error!("👉 请准备 config.toml 并在 [databases] 下配置至少一个备份目标。");
            std::process::exit(1);
        }
    };

    let state = match AppState::new(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ 服务初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ 监听 {} 失败: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("备份编排服务已启动: http://{}", addr);

    if let Err(e) = axum::serve(listener, router(state)).await {
        error!("❌ 服务运行失败: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> backup_core::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::find_and_load_config()?,
    };

    if config.databases.is_empty() {
        return Err(backup_core::BackupError::validation(
            "配置中没有任何备份目标，请在 [databases] 下至少配置一个分类",
        ));
    }

    Ok(config)
}

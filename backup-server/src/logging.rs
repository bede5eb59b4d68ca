/// 初始化日志系统
///
/// 遵循服务端日志惯例：
/// - `RUST_LOG` 覆盖默认级别
/// - `BACKUP_LOG_FILE` 设置后输出到文件（详细格式），否则输出终端（紧凑格式）
/// - `verbose` 把默认级别从 info 提到 debug
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Ok(log_file) = std::env::var("BACKUP_LOG_FILE") {
        // 输出到文件 - 详细格式便于排障
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .expect("Failed to create log file");

        fmt()
            .with_env_filter(env_filter)
            .with_writer(file)
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .init();
    } else {
        // 输出到终端 - 紧凑格式
        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_names(false)
            .compact()
            .init();
    }
}

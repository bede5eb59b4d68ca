use crate::constants::{api, config as config_consts};
use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// 按分类编码建的备份目标配置表
    #[serde(default)]
    pub databases: HashMap<String, TargetConfig>,
}

/// 服务监听配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 本地状态库配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// 备份管理接口调用配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,
    /// 响应超时（毫秒）
    pub read_timeout_ms: u64,
    /// 最大重试次数（由外层批处理框架消费，核心不重试）
    pub max_retry_attempts: u32,
}

/// 单个备份目标的配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TargetConfig {
    pub api_token: String,
    pub universe_uuid: String,
    #[serde(default)]
    pub customer_uuid: Option<String>,
    pub storage_config_uuid: String,
    pub full_backup_url: String,
    pub incremental_backup_url: String,
    pub last_backup_url: String,
    pub expiry_ms: i64,
    /// 引擎侧的备份格式标签（例如 YQL_TABLE_TYPE）
    pub backup_type: String,
    pub db_name: String,
    /// 分类类型：full_backup 或 incremental_backup
    pub backup_category_type: String,
    #[serde(default)]
    pub parent_category: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: config_consts::DEFAULT_HOST.to_string(),
            port: config_consts::DEFAULT_PORT,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: config_consts::get_database_path()
                .to_string_lossy()
                .to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: api::http::DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: api::http::DEFAULT_READ_TIMEOUT_MS,
            max_retry_attempts: api::http::DEFAULT_RETRY_COUNT,
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    ///
    /// 按优先级查找 config.toml -> backup-orchestrator.toml ->
    /// .backup-orchestrator.toml。没有备份目标配置的服务毫无意义，
    /// 所以找不到配置文件直接报错，不生成默认配置。
    pub fn find_and_load_config() -> Result<Self> {
        for config_file in &config_consts::CONFIG_FILE_NAMES {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        Err(BackupError::ConfigFileNotFound)
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
[server]
host = "0.0.0.0"
port = 9090

[database]
path = "data/test.db"

[api]
connect_timeout_ms = 5000
read_timeout_ms = 10000
max_retry_attempts = 2

[databases.HWA_FULL]
api_token = "token-a"
universe_uuid = "uni-1"
storage_config_uuid = "sto-1"
full_backup_url = "http://yba.local/full"
incremental_backup_url = "http://yba.local/incr"
last_backup_url = "http://yba.local/last"
expiry_ms = 86400000
backup_type = "YQL_TABLE_TYPE"
db_name = "hwa"
backup_category_type = "full_backup"
"#
    }

    #[test]
    fn test_load_config_from_toml() {
        let config: AppConfig = toml::from_str(sample_toml()).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.api.max_retry_attempts, 2);
        assert_eq!(config.databases.len(), 1);

        let target = &config.databases["HWA_FULL"];
        assert_eq!(target.db_name, "hwa");
        assert_eq!(target.backup_category_type, "full_backup");
        assert_eq!(target.parent_category, None);
    }

    #[test]
    fn test_defaults_apply_when_sections_missing() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.api.connect_timeout_ms, 30_000);
        assert_eq!(config.api.read_timeout_ms, 60_000);
        assert!(config.databases.is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load_from_file("does-not-exist.toml");
        assert!(result.is_err());
    }
}

use crate::config::AppConfig;
use crate::error::{BackupError, Result};
use std::collections::HashMap;

/// 解析后的备份目标
///
/// 进程启动时由配置构建一次，之后只读。
#[derive(Debug, Clone, PartialEq)]
pub struct BackupTarget {
    pub api_token: String,
    pub universe_uuid: String,
    pub customer_uuid: Option<String>,
    pub storage_config_uuid: String,
    pub full_backup_url: String,
    pub incremental_backup_url: String,
    pub last_backup_url: String,
    pub expiry_ms: i64,
    pub backup_type: String,
    pub db_name: String,
    pub backup_category_type: String,
    pub parent_category: Option<String>,
}

/// 分类编码到备份目标的解析器
///
/// 配置表在构建时统一把键转成大写，resolve 时大小写不敏感。
/// 构建完成后不再变更，可在多个工作流之间无锁共享。
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    targets: HashMap<String, BackupTarget>,
}

impl ConfigResolver {
    /// 从应用配置构建解析器
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut targets = HashMap::new();

        for (category_code, db_config) in &config.databases {
            if db_config.api_token.trim().is_empty() {
                return Err(BackupError::validation(format!(
                    "备份目标 {category_code} 缺少 api_token"
                )));
            }
            if db_config.universe_uuid.trim().is_empty() {
                return Err(BackupError::validation(format!(
                    "备份目标 {category_code} 缺少 universe_uuid"
                )));
            }

            let target = BackupTarget {
                api_token: db_config.api_token.clone(),
                universe_uuid: db_config.universe_uuid.clone(),
                customer_uuid: db_config.customer_uuid.clone(),
                storage_config_uuid: db_config.storage_config_uuid.clone(),
                full_backup_url: db_config.full_backup_url.clone(),
                incremental_backup_url: db_config.incremental_backup_url.clone(),
                last_backup_url: db_config.last_backup_url.clone(),
                expiry_ms: db_config.expiry_ms,
                backup_type: db_config.backup_type.clone(),
                db_name: db_config.db_name.clone(),
                backup_category_type: db_config.backup_category_type.clone(),
                parent_category: db_config.parent_category.clone(),
            };

            targets.insert(category_code.to_uppercase(), target);
        }

        Ok(Self { targets })
    }

    /// 按分类编码解析备份目标（大小写不敏感）
    ///
    /// 找不到时返回 ConfigNotFound，整条工作流在任何副作用之前终止。
    pub fn resolve(&self, category_code: &str) -> Result<&BackupTarget> {
        self.targets
            .get(&category_code.to_uppercase())
            .ok_or_else(|| BackupError::ConfigNotFound(category_code.to_string()))
    }

    /// 已配置的备份目标数量
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

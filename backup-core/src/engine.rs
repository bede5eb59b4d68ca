use crate::constants::backup as backup_consts;
use crate::error::{BackupError, Result};
use crate::gateway::{BackupApi, BackupPage};
use crate::resolver::BackupTarget;
use tracing::info;

/// 备份分类类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Full,
    Incremental,
}

impl BackupKind {
    /// 解析配置里的分类类型标签（大小写不敏感）
    ///
    /// 两者之外的值是 UnsupportedBackupType，不发起任何外部调用。
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.eq_ignore_ascii_case(backup_consts::FULL_BACKUP) {
            Ok(Self::Full)
        } else if raw.eq_ignore_ascii_case(backup_consts::INCREMENTAL_BACKUP) {
            Ok(Self::Incremental)
        } else {
            Err(BackupError::UnsupportedBackupType(raw.to_string()))
        }
    }
}

/// 执行备份决策
///
/// 全量直接提交；增量先查最近备份、解析基线ID、再提交。
/// 这里只做决策和驱动网关，不落库也不重试。
pub async fn run_backup<G: BackupApi>(
    gateway: &G,
    target: &BackupTarget,
) -> Result<serde_json::Value> {
    match BackupKind::parse(&target.backup_category_type)? {
        BackupKind::Full => {
            info!("提交全量备份: db={}", target.db_name);
            gateway.submit_full_backup(target).await
        }
        BackupKind::Incremental => {
            let page = gateway.fetch_last_backup(target).await?;
            let base_backup_uuid = extract_base_backup_uuid(&page)?;
            info!(
                "提交增量备份: db={}, base={}",
                target.db_name, base_backup_uuid
            );
            gateway
                .submit_incremental_backup(target, &base_backup_uuid)
                .await
        }
    }
}

/// 从最近备份响应里提取基线备份ID
///
/// 结果列表为空说明没有可挂靠的历史备份；第一条存在但
/// baseBackupUUID 为空则是响应残缺，两种情况都终止增量流程。
pub fn extract_base_backup_uuid(page: &BackupPage) -> Result<String> {
    let first = page.entities.first().ok_or(BackupError::NoPriorBackup)?;

    first
        .common_backup_info
        .as_ref()
        .and_then(|info| info.base_backup_uuid.clone())
        .ok_or(BackupError::MissingBaseBackupId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{BackupEntity, CommonBackupInfo};

    fn page_with_uuid(uuid: Option<&str>) -> BackupPage {
        BackupPage {
            entities: vec![BackupEntity {
                common_backup_info: Some(CommonBackupInfo {
                    base_backup_uuid: uuid.map(str::to_string),
                }),
            }],
        }
    }

    #[test]
    fn test_parse_backup_kind() {
        assert_eq!(BackupKind::parse("full_backup").unwrap(), BackupKind::Full);
        assert_eq!(
            BackupKind::parse("INCREMENTAL_BACKUP").unwrap(),
            BackupKind::Incremental
        );
        assert!(matches!(
            BackupKind::parse("snapshot"),
            Err(BackupError::UnsupportedBackupType(raw)) if raw == "snapshot"
        ));
    }

    #[test]
    fn test_extract_base_uuid_present() {
        let page = page_with_uuid(Some("uuid-123"));
        assert_eq!(extract_base_backup_uuid(&page).unwrap(), "uuid-123");
    }

    #[test]
    fn test_extract_fails_when_no_entities() {
        let page = BackupPage::default();
        assert!(matches!(
            extract_base_backup_uuid(&page),
            Err(BackupError::NoPriorBackup)
        ));
    }

    #[test]
    fn test_extract_fails_when_uuid_missing() {
        let page = page_with_uuid(None);
        assert!(matches!(
            extract_base_backup_uuid(&page),
            Err(BackupError::MissingBaseBackupId)
        ));

        let page = BackupPage {
            entities: vec![BackupEntity {
                common_backup_info: None,
            }],
        };
        assert!(matches!(
            extract_base_backup_uuid(&page),
            Err(BackupError::MissingBaseBackupId)
        ));
    }
}

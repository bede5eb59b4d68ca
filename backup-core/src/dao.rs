use crate::constants::{fields, status};
use crate::db::{BackupAttemptRecord, BatchExecutionRecord, DbManager};
use crate::error::{BackupError, Result};
use tracing::{error, info};

/// 备份尝试状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    InProgress,
    Success,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => status::BACKUP_IN_PROGRESS,
            AttemptStatus::Success => status::BACKUP_SUCCESS,
            AttemptStatus::Failed => status::BACKUP_FAILED,
        }
    }
}

/// 批次执行终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Completed => status::BATCH_COMPLETED,
            BatchStatus::Failed => status::BATCH_FAILED,
        }
    }
}

/// 状态落库服务
///
/// 负责把备份生命周期写进两张表：备份尝试历史表和批次执行状态表。
/// 起始记录写失败必须上抛（没有审计记录就不该去调外部接口）；
/// 终态写失败只记日志不再上抛，避免存储问题盖过真正的备份结果。
#[derive(Debug, Clone)]
pub struct StatusReconciler {
    db: DbManager,
}

impl StatusReconciler {
    pub fn new(db: DbManager) -> Self {
        Self { db }
    }

    /// 写入 IN_PROGRESS 起始记录
    ///
    /// 在任何外部调用之前执行，失败以 Persistence 错误上抛并终止流程。
    pub async fn record_start(
        &self,
        batch_id: &str,
        category_code: &str,
        backup_type: &str,
        business_date: &str,
    ) -> Result<i64> {
        info!("写入备份起始记录: batch_id={}", batch_id);

        self.db
            .insert_backup_attempt(
                batch_id,
                category_code,
                backup_type,
                AttemptStatus::InProgress.as_str(),
                business_date,
            )
            .await
            .map_err(|e| BackupError::persistence(format!("写入备份表失败: {e}")))
    }

    /// 备份成功落库：尝试记录翻成 SUCCESS，批次记录翻成 COMPLETED
    pub async fn record_success(&self, batch_id: &str, business_date: &str, external_response: &str) {
        if let Err(e) = self
            .db
            .update_backup_status(
                batch_id,
                AttemptStatus::Success.as_str(),
                business_date,
                external_response,
            )
            .await
        {
            error!("更新备份表状态失败: batch_id={}, {}", batch_id, e);
        }

        if let Err(e) = self
            .db
            .update_batch_status(batch_id, BatchStatus::Completed.as_str(), None)
            .await
        {
            error!("更新批次执行状态失败: batch_id={}, {}", batch_id, e);
        }

        info!("备份成功落库完成: batch_id={}", batch_id);
    }

    /// 备份失败落库：尝试记录翻成 FAILED，批次记录带上错误扩展字段
    pub async fn record_failure(&self, batch_id: &str, business_date: &str, error_text: &str) {
        if let Err(e) = self
            .db
            .update_backup_status(
                batch_id,
                AttemptStatus::Failed.as_str(),
                business_date,
                error_text,
            )
            .await
        {
            error!("更新备份表状态失败: batch_id={}, {}", batch_id, e);
        }

        self.mark_batch_failed(batch_id, error_text).await;
    }

    /// 把批次执行记录补成 FAILED 并带上错误扩展字段（尽力而为）
    ///
    /// 除了失败落库的后半段，起始记录之前流程失败时入站面也用它
    /// 把已登记的批次行从 IN_PROGRESS 补成 FAILED。
    pub async fn mark_batch_failed(&self, batch_id: &str, error_text: &str) {
        let extension_fields =
            serde_json::json!({ (fields::ERROR_MESSAGE): error_text }).to_string();

        if let Err(e) = self
            .db
            .update_batch_status(batch_id, BatchStatus::Failed.as_str(), Some(extension_fields))
            .await
        {
            error!("更新批次执行状态失败: batch_id={}, {}", batch_id, e);
        }
    }

    /// 查询批次执行记录（业务日期来源）
    pub async fn get_batch_details(
        &self,
        batch_id: &str,
        category_code: &str,
    ) -> Result<Option<BatchExecutionRecord>> {
        self.db.get_batch_execution(batch_id, category_code).await
    }

    /// 登记批次执行记录（入站面代行批处理框架职责）
    pub async fn register_batch_execution(
        &self,
        batch_id: &str,
        category_code: &str,
        execution_date: &str,
    ) -> Result<()> {
        self.db
            .register_batch_execution(
                batch_id,
                category_code,
                execution_date,
                status::BACKUP_IN_PROGRESS,
            )
            .await
    }

    /// 查询备份尝试记录
    pub async fn get_attempt(
        &self,
        batch_id: &str,
        category_code: &str,
    ) -> Result<Option<BackupAttemptRecord>> {
        self.db.get_backup_attempt(batch_id, category_code).await
    }

    /// 备份尝试记录总数
    pub async fn count_attempts(&self) -> Result<i64> {
        self.db.count_backup_attempts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn reconciler() -> StatusReconciler {
        let db = DbManager::new_memory().await.unwrap();
        StatusReconciler::new(db)
    }

    #[tokio::test]
    async fn test_record_start_creates_in_progress_row() {
        let reconciler = reconciler().await;

        let id = reconciler
            .record_start("B-001", "HWA_FULL", "full_backup", "20260830")
            .await
            .unwrap();
        assert!(id > 0);

        let attempt = reconciler
            .get_attempt("B-001", "HWA_FULL")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.status, "IN_PROGRESS");
        assert_eq!(attempt.backup_type, "full_backup");
        assert_eq!(attempt.business_date.as_deref(), Some("20260830"));
        assert!(attempt.end_time.is_none());
    }

    #[tokio::test]
    async fn test_record_success_flips_both_stores() {
        let reconciler = reconciler().await;
        reconciler
            .register_batch_execution("B-002", "HWA_FULL", "2026-08-30")
            .await
            .unwrap();
        reconciler
            .record_start("B-002", "HWA_FULL", "full_backup", "20260830")
            .await
            .unwrap();

        reconciler
            .record_success("B-002", "20260830", r#"{"taskUUID":"t-1"}"#)
            .await;

        let attempt = reconciler
            .get_attempt("B-002", "HWA_FULL")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.status, "SUCCESS");
        assert_eq!(
            attempt.external_response.as_deref(),
            Some(r#"{"taskUUID":"t-1"}"#)
        );
        assert!(attempt.end_time.is_some());

        let batch = reconciler
            .get_batch_details("B-002", "HWA_FULL")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.status, "COMPLETED");
        assert_eq!(batch.extension_fields, None);
    }

    #[tokio::test]
    async fn test_record_failure_carries_error_extension() {
        let reconciler = reconciler().await;
        reconciler
            .register_batch_execution("B-003", "HWA_INCR", "2026-08-30")
            .await
            .unwrap();
        reconciler
            .record_start("B-003", "HWA_INCR", "incremental_backup", "20260830")
            .await
            .unwrap();

        reconciler
            .record_failure("B-003", "20260830", "未找到历史备份，无法执行增量备份")
            .await;

        let attempt = reconciler
            .get_attempt("B-003", "HWA_INCR")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.status, "FAILED");
        assert!(
            attempt
                .external_response
                .as_deref()
                .unwrap()
                .contains("历史备份")
        );

        let batch = reconciler
            .get_batch_details("B-003", "HWA_INCR")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.status, "FAILED");
        let extensions: serde_json::Value =
            serde_json::from_str(batch.extension_fields.as_deref().unwrap()).unwrap();
        assert!(
            extensions["error_message"]
                .as_str()
                .unwrap()
                .contains("历史备份")
        );
    }

    #[tokio::test]
    async fn test_terminal_update_swallows_store_failure() {
        // 状态库整体不可用：终态写入只记日志，起始写入必须上抛
        let reconciler = StatusReconciler::new(DbManager::new_closed());

        reconciler
            .record_failure("B-DOWN", "20260830", "网关超时")
            .await;
        reconciler.record_success("B-DOWN", "20260830", "{}").await;
        reconciler.mark_batch_failed("B-DOWN", "网关超时").await;

        let result = reconciler
            .record_start("B-DOWN", "HWA_FULL", "full_backup", "20260830")
            .await;
        assert!(matches!(result, Err(BackupError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_terminal_update_is_best_effort_without_start_row() {
        let reconciler = reconciler().await;

        // 没有起始记录时终态更新不报错，只是无行可改
        reconciler.record_success("B-404", "20260830", "{}").await;
        assert_eq!(reconciler.count_attempts().await.unwrap(), 0);
    }
}

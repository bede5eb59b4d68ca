use crate::Result;
use tokio::sync::oneshot;

use super::models::{BackupAttemptRecord, BatchExecutionRecord};

/// DuckDB数据库操作消息
#[derive(Debug)]
pub enum DbMessage {
    /// 初始化数据库表
    InitTables {
        respond_to: oneshot::Sender<Result<()>>,
    },

    // ========== 备份尝试表 ==========
    /// 写入一条 IN_PROGRESS 备份尝试记录
    InsertBackupAttempt {
        batch_id: String,
        category_code: String,
        backup_type: String,
        status: String,
        business_date: String,
        respond_to: oneshot::Sender<Result<i64>>,
    },
    /// 把备份尝试记录翻到终态
    UpdateBackupStatus {
        batch_id: String,
        status: String,
        business_date: String,
        external_response: String,
        respond_to: oneshot::Sender<Result<()>>,
    },
    /// 按批次ID和分类编码查备份尝试记录
    GetBackupAttempt {
        batch_id: String,
        category_code: String,
        respond_to: oneshot::Sender<Result<Option<BackupAttemptRecord>>>,
    },
    /// 备份尝试记录总数
    CountBackupAttempts {
        respond_to: oneshot::Sender<Result<i64>>,
    },

    // ========== 批次执行表 ==========
    /// 登记批次执行记录（代行批处理框架职责）
    RegisterBatchExecution {
        batch_id: String,
        category_code: String,
        execution_date: String,
        status: String,
        respond_to: oneshot::Sender<Result<()>>,
    },
    /// 查批次执行记录
    GetBatchExecution {
        batch_id: String,
        category_code: String,
        respond_to: oneshot::Sender<Result<Option<BatchExecutionRecord>>>,
    },
    /// 更新批次执行终态
    UpdateBatchStatus {
        batch_id: String,
        status: String,
        extension_fields: Option<String>,
        respond_to: oneshot::Sender<Result<()>>,
    },
}

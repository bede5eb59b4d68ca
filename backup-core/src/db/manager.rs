use crate::{BackupError, Result};
use std::path::Path;
use tokio::sync::{mpsc, oneshot};

use super::actor::DbActor;
use super::messages::DbMessage;
use super::models::{BackupAttemptRecord, BatchExecutionRecord};

/// DuckDB数据库管理器
///
/// 对外是异步、可克隆的句柄，内部把操作发给单线程 Actor 执行。
#[derive(Debug, Clone)]
pub struct DbManager {
    sender: mpsc::Sender<DbMessage>,
}

impl DbManager {
    /// 创建新的数据库管理器
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // 确保数据库文件的父目录存在
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let (sender, receiver) = mpsc::channel(100);

        let actor = DbActor::new(db_path)?;
        tokio::spawn(actor.run(receiver));

        let manager = Self { sender };
        manager.init_tables().await?;

        Ok(manager)
    }

    /// 创建内存数据库管理器（主要用于测试）
    pub async fn new_memory() -> Result<Self> {
        let (sender, receiver) = mpsc::channel(100);

        let actor = DbActor::new_memory()?;
        tokio::spawn(actor.run(receiver));

        let manager = Self { sender };
        manager.init_tables().await?;

        Ok(manager)
    }

    /// 构造一个 Actor 已关闭的管理器，用于验证调用方的降级路径
    #[cfg(test)]
    pub(crate) fn new_closed() -> Self {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        Self { sender }
    }

    /// 初始化数据库表
    async fn init_tables(&self) -> Result<()> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::InitTables { respond_to })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 写入备份尝试记录
    pub async fn insert_backup_attempt(
        &self,
        batch_id: &str,
        category_code: &str,
        backup_type: &str,
        status: &str,
        business_date: &str,
    ) -> Result<i64> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::InsertBackupAttempt {
                batch_id: batch_id.to_string(),
                category_code: category_code.to_string(),
                backup_type: backup_type.to_string(),
                status: status.to_string(),
                business_date: business_date.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 更新备份尝试记录状态
    pub async fn update_backup_status(
        &self,
        batch_id: &str,
        status: &str,
        business_date: &str,
        external_response: &str,
    ) -> Result<()> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::UpdateBackupStatus {
                batch_id: batch_id.to_string(),
                status: status.to_string(),
                business_date: business_date.to_string(),
                external_response: external_response.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 查询备份尝试记录
    pub async fn get_backup_attempt(
        &self,
        batch_id: &str,
        category_code: &str,
    ) -> Result<Option<BackupAttemptRecord>> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::GetBackupAttempt {
                batch_id: batch_id.to_string(),
                category_code: category_code.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 备份尝试记录总数
    pub async fn count_backup_attempts(&self) -> Result<i64> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::CountBackupAttempts { respond_to })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 登记批次执行记录
    pub async fn register_batch_execution(
        &self,
        batch_id: &str,
        category_code: &str,
        execution_date: &str,
        status: &str,
    ) -> Result<()> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::RegisterBatchExecution {
                batch_id: batch_id.to_string(),
                category_code: category_code.to_string(),
                execution_date: execution_date.to_string(),
                status: status.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 查询批次执行记录
    pub async fn get_batch_execution(
        &self,
        batch_id: &str,
        category_code: &str,
    ) -> Result<Option<BatchExecutionRecord>> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::GetBatchExecution {
                batch_id: batch_id.to_string(),
                category_code: category_code.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }

    /// 更新批次执行终态
    pub async fn update_batch_status(
        &self,
        batch_id: &str,
        status: &str,
        extension_fields: Option<String>,
    ) -> Result<()> {
        let (respond_to, receiver) = oneshot::channel();

        self.sender
            .send(DbMessage::UpdateBatchStatus {
                batch_id: batch_id.to_string(),
                status: status.to_string(),
                extension_fields,
                respond_to,
            })
            .await
            .map_err(|_| BackupError::custom("数据库Actor已关闭"))?;

        receiver
            .await
            .map_err(|_| BackupError::custom("等待数据库响应超时"))?
    }
}

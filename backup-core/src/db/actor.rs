use crate::Result;
use duckdb::{Connection, params};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::messages::DbMessage;
use super::models::{BackupAttemptRecord, BatchExecutionRecord};

/// DuckDB Actor - 确保单线程访问DuckDB
pub struct DbActor {
    connection: Connection,
}

impl DbActor {
    /// 创建新的DuckDB Actor
    pub fn new(db_path: PathBuf) -> Result<Self> {
        let connection = Connection::open(db_path)?;
        Ok(Self { connection })
    }

    /// 创建内存DuckDB Actor
    pub fn new_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        Ok(Self { connection })
    }

    /// 运行Actor消息循环
    pub async fn run(mut self, mut receiver: mpsc::Receiver<DbMessage>) {
        info!("DuckDB Actor 已启动");

        while let Some(message) = receiver.recv().await {
            self.handle_message(message);
        }

        info!("DuckDB Actor 已关闭");
    }

    /// 处理数据库消息
    fn handle_message(&mut self, message: DbMessage) {
        match message {
            DbMessage::InitTables { respond_to } => {
                let result = self.init_tables();
                let _ = respond_to.send(result);
            }
            DbMessage::InsertBackupAttempt {
                batch_id,
                category_code,
                backup_type,
                status,
                business_date,
                respond_to,
            } => {
                let result = self.insert_backup_attempt(
                    &batch_id,
                    &category_code,
                    &backup_type,
                    &status,
                    &business_date,
                );
                let _ = respond_to.send(result);
            }
            DbMessage::UpdateBackupStatus {
                batch_id,
                status,
                business_date,
                external_response,
                respond_to,
            } => {
                let result =
                    self.update_backup_status(&batch_id, &status, &business_date, &external_response);
                let _ = respond_to.send(result);
            }
            DbMessage::GetBackupAttempt {
                batch_id,
                category_code,
                respond_to,
            } => {
                let result = self.get_backup_attempt(&batch_id, &category_code);
                let _ = respond_to.send(result);
            }
            DbMessage::CountBackupAttempts { respond_to } => {
                let result = self.count_backup_attempts();
                let _ = respond_to.send(result);
            }
            DbMessage::RegisterBatchExecution {
                batch_id,
                category_code,
                execution_date,
                status,
                respond_to,
            } => {
                let result =
                    self.register_batch_execution(&batch_id, &category_code, &execution_date, &status);
                let _ = respond_to.send(result);
            }
            DbMessage::GetBatchExecution {
                batch_id,
                category_code,
                respond_to,
            } => {
                let result = self.get_batch_execution(&batch_id, &category_code);
                let _ = respond_to.send(result);
            }
            DbMessage::UpdateBatchStatus {
                batch_id,
                status,
                extension_fields,
                respond_to,
            } => {
                let result =
                    self.update_batch_status(&batch_id, &status, extension_fields.as_deref());
                let _ = respond_to.send(result);
            }
        }
    }

    /// 初始化数据库表
    fn init_tables(&mut self) -> Result<()> {
        debug!("正在初始化DuckDB表...");

        let sql_content = include_str!("../../migrations/init_duckdb.sql");

        // 按分号分割SQL语句并执行
        for statement in sql_content.split(';').filter(|s| !s.trim().is_empty()) {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                self.connection.execute(trimmed, [])?;
            }
        }

        info!("DuckDB表初始化完成");
        Ok(())
    }

    /// 写入备份尝试记录
    fn insert_backup_attempt(
        &mut self,
        batch_id: &str,
        category_code: &str,
        backup_type: &str,
        status: &str,
        business_date: &str,
    ) -> Result<i64> {
        self.connection.execute(
            "INSERT INTO backup_attempts (batch_id, category_code, backup_type, status, business_date)
             VALUES (?, ?, ?, ?, ?)",
            params![batch_id, category_code, backup_type, status, business_date],
        )?;

        // 获取最后插入的ID
        let id: i64 = self
            .connection
            .query_row("SELECT currval('backup_attempt_id_seq')", [], |row| {
                row.get(0)
            })?;

        Ok(id)
    }

    /// 更新备份尝试记录状态
    fn update_backup_status(
        &mut self,
        batch_id: &str,
        status: &str,
        business_date: &str,
        external_response: &str,
    ) -> Result<()> {
        self.connection.execute(
            "UPDATE backup_attempts
             SET status = ?, business_date = ?, external_response = ?, end_time = current_timestamp
             WHERE batch_id = ?",
            params![status, business_date, external_response, batch_id],
        )?;
        Ok(())
    }

    /// 查询备份尝试记录
    fn get_backup_attempt(
        &mut self,
        batch_id: &str,
        category_code: &str,
    ) -> Result<Option<BackupAttemptRecord>> {
        let mut stmt = self.connection.prepare(
            "SELECT id, batch_id, category_code, backup_type, status, business_date,
                    start_time, end_time, external_response
             FROM backup_attempts WHERE batch_id = ? AND category_code = ?",
        )?;

        let mut rows = stmt.query(params![batch_id, category_code])?;

        if let Some(row) = rows.next()? {
            Ok(Some(BackupAttemptRecord {
                id: row.get(0)?,
                batch_id: row.get(1)?,
                category_code: row.get(2)?,
                backup_type: row.get(3)?,
                status: row.get(4)?,
                business_date: row.get(5)?,
                start_time: row.get(6)?,
                end_time: row.get(7)?,
                external_response: row.get(8)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// 备份尝试记录总数
    fn count_backup_attempts(&mut self) -> Result<i64> {
        let count: i64 =
            self.connection
                .query_row("SELECT count(*) FROM backup_attempts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 登记批次执行记录
    fn register_batch_execution(
        &mut self,
        batch_id: &str,
        category_code: &str,
        execution_date: &str,
        status: &str,
    ) -> Result<()> {
        self.connection.execute(
            "INSERT INTO batch_executions (batch_id, category_code, execution_date, status)
             VALUES (?, ?, ?, ?)",
            params![batch_id, category_code, execution_date, status],
        )?;
        Ok(())
    }

    /// 查询批次执行记录
    fn get_batch_execution(
        &mut self,
        batch_id: &str,
        category_code: &str,
    ) -> Result<Option<BatchExecutionRecord>> {
        let mut stmt = self.connection.prepare(
            "SELECT batch_id, category_code, execution_date, status, extension_fields, updated_at
             FROM batch_executions WHERE batch_id = ? AND category_code = ?",
        )?;

        let mut rows = stmt.query(params![batch_id, category_code])?;

        if let Some(row) = rows.next()? {
            Ok(Some(BatchExecutionRecord {
                batch_id: row.get(0)?,
                category_code: row.get(1)?,
                execution_date: row.get(2)?,
                status: row.get(3)?,
                extension_fields: row.get(4)?,
                updated_at: row.get(5)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// 更新批次执行终态
    fn update_batch_status(
        &mut self,
        batch_id: &str,
        status: &str,
        extension_fields: Option<&str>,
    ) -> Result<()> {
        if let Some(extension_fields) = extension_fields {
            self.connection.execute(
                "UPDATE batch_executions
                 SET status = ?, extension_fields = ?, updated_at = current_timestamp
                 WHERE batch_id = ?",
                params![status, extension_fields, batch_id],
            )?;
        } else {
            self.connection.execute(
                "UPDATE batch_executions
                 SET status = ?, extension_fields = NULL, updated_at = current_timestamp
                 WHERE batch_id = ?",
                params![status, batch_id],
            )?;
        }
        Ok(())
    }
}

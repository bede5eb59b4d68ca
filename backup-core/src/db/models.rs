use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 备份尝试记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupAttemptRecord {
    pub id: i64,
    pub batch_id: String,
    pub category_code: String,
    pub backup_type: String,
    pub status: String,
    pub business_date: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub external_response: Option<String>,
}

/// 批次执行记录（批处理框架所有）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchExecutionRecord {
    pub batch_id: String,
    pub category_code: String,
    pub execution_date: String,
    pub status: String,
    pub extension_fields: Option<String>,
    pub updated_at: DateTime<Utc>,
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackupError>;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("配置错误: {0}")]
    Config(#[from] toml::de::Error),

    #[error("配置文件未找到")]
    ConfigFileNotFound,

    #[error("未找到备份分类配置: {0}")]
    ConfigNotFound(String),

    #[error("请求参数无效: {0}")]
    Validation(String),

    #[error("不支持的备份类型: {0}")]
    UnsupportedBackupType(String),

    #[error("未找到历史备份，无法执行增量备份")]
    NoPriorBackup,

    #[error("历史备份缺少 baseBackupUUID 字段")]
    MissingBaseBackupId,

    #[error("备份接口调用失败: {0}")]
    Gateway(String),

    #[error("数据库写入失败: {0}")]
    Persistence(String),

    #[error("DuckDB数据库错误: {0}")]
    DuckDb(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("任务执行错误: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("自定义错误: {0}")]
    Custom(String),
}

// 为DuckDB错误实现From trait
impl From<duckdb::Error> for BackupError {
    fn from(err: duckdb::Error) -> Self {
        BackupError::DuckDb(err.to_string())
    }
}

impl BackupError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// 终态反馈给触发方时是否属于业务可见错误
    ///
    /// 业务可见错误直接把错误文本带回触发方；其余错误只回报固定的
    /// 技术错误提示，避免内部细节外泄。
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            BackupError::Validation(_)
                | BackupError::ConfigNotFound(_)
                | BackupError::UnsupportedBackupType(_)
                | BackupError::NoPriorBackup
                | BackupError::MissingBaseBackupId
                | BackupError::Gateway(_)
        )
    }
}

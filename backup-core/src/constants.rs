/// 备份与批次状态常量
pub mod status {
    /// 备份进行中
    pub const BACKUP_IN_PROGRESS: &str = "IN_PROGRESS";

    /// 备份成功
    pub const BACKUP_SUCCESS: &str = "SUCCESS";

    /// 备份失败
    pub const BACKUP_FAILED: &str = "FAILED";

    /// 批次执行完成
    pub const BATCH_COMPLETED: &str = "COMPLETED";

    /// 批次执行失败
    pub const BATCH_FAILED: &str = "FAILED";
}

/// 备份请求相关常量
pub mod backup {
    /// 全量备份分类标识
    pub const FULL_BACKUP: &str = "full_backup";

    /// 增量备份分类标识
    pub const INCREMENTAL_BACKUP: &str = "incremental_backup";

    /// 备份类别标签（控制器托管备份的固定哨兵值）
    pub const BACKUP_CATEGORY: &str = "YB_CONTROLLER";

    /// 过期时间单位
    pub const EXPIRY_TIME_UNIT: &str = "MILLISECONDS";

    /// 查询最近备份时的排序字段
    pub const SORT_BY: &str = "createTime";

    /// 查询最近备份时的排序方向
    pub const SORT_DIRECTION: &str = "DESC";

    /// 查询最近备份时只取最新一条
    pub const LAST_BACKUP_LIMIT: u32 = 1;
}

/// 备份管理接口相关常量
pub mod api {
    /// 鉴权令牌请求头
    pub const AUTH_TOKEN_HEADER: &str = "X-AUTH-YW-API-TOKEN";

    /// HTTP相关常量
    pub mod http {
        /// 默认连接超时时间（毫秒）
        pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;

        /// 默认响应超时时间（毫秒）
        pub const DEFAULT_READ_TIMEOUT_MS: u64 = 60_000;

        /// 默认重试次数（重试由外层批处理框架执行，核心不重试）
        pub const DEFAULT_RETRY_COUNT: u32 = 3;
    }
}

/// 对外字段名常量
pub mod fields {
    /// 扩展字段里的错误信息键
    pub const ERROR_MESSAGE: &str = "error_message";

    /// 对外统一的技术错误提示
    pub const ERROR_DETAIL: &str = "Technical Error";
}

/// 日期格式相关常量
pub mod date {
    /// 业务日期格式
    pub const BUSINESS_DATE_PATTERN: &str = "%Y%m%d";
}

/// 应用配置相关常量
pub mod config {
    use std::path::{Path, PathBuf};

    /// 数据目录名
    pub const DATA_DIR_NAME: &str = "data";

    /// 数据库文件名
    pub const DATABASE_FILE_NAME: &str = "backup_orchestrator.db";

    /// 配置文件查找顺序
    pub const CONFIG_FILE_NAMES: [&str; 3] = [
        "config.toml",
        "backup-orchestrator.toml",
        ".backup-orchestrator.toml",
    ];

    /// 默认监听地址
    pub const DEFAULT_HOST: &str = "127.0.0.1";

    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 8080;

    /// 获取数据库文件路径（跨平台）
    pub fn get_database_path() -> PathBuf {
        Path::new(".").join(DATA_DIR_NAME).join(DATABASE_FILE_NAME)
    }
}

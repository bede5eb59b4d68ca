// DuckDB数据库模块
//
// 通过Actor模式满足DuckDB的单线程访问要求，对上层提供异步、
// 类型安全的API。
//
// 主要组件：
// - DbManager: 高级API接口，供应用程序使用
// - DbActor: 内部Actor，处理实际的数据库操作
// - 数据模型和消息定义

mod actor;
mod manager;
mod messages;
mod models;

// 公开核心接口
pub use manager::DbManager;
pub use models::{BackupAttemptRecord, BatchExecutionRecord};

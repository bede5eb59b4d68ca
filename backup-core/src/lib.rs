//! 数据库备份编排核心库
//!
//! 面向外部备份管理平台（YBA 风格 REST 接口）的备份编排：
//! 入站参数校验、按分类编码解析备份目标、全量/增量决策、
//! 网关调用以及 DuckDB 双表状态落库。
//!
//! 核心不做重试、不做调度，重试由外层批处理框架负责。

pub mod config;
pub mod constants;
pub mod dao;
pub mod db;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod resolver;
pub mod service;
pub mod utils;
pub mod validation;

pub use error::{BackupError, Result};

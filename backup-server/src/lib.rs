//! 备份编排服务的 HTTP 入站面
//!
//! 暴露 `POST /backupProcess` 和 `GET /health`，把批次请求
//! 交给 backup-core 的编排服务执行。

pub mod logging;
pub mod routes;
pub mod state;

pub use logging::setup_logging;
pub use routes::router;
pub use state::AppState;

use backup_core::Result;
use backup_core::config::AppConfig;
use backup_core::dao::StatusReconciler;
use backup_core::db::DbManager;
use backup_core::gateway::HttpBackupGateway;
use backup_core::resolver::ConfigResolver;
use backup_core::service::BackupService;
use std::sync::Arc;
use tracing::info;

/// 请求处理器共享的应用状态
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<BackupService<HttpBackupGateway>>,
    pub reconciler: StatusReconciler,
}

impl AppState {
    /// 按配置装配全部组件：配置解析器、HTTP 网关、DuckDB 状态库
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let resolver = Arc::new(ConfigResolver::from_config(config)?);
        info!("已加载 {} 个备份目标配置", resolver.len());

        let gateway = HttpBackupGateway::from_config(&config.api)?;
        let db = DbManager::new(&config.database.path).await?;
        let reconciler = StatusReconciler::new(db);

        Ok(Self {
            service: Arc::new(BackupService::new(resolver, gateway, reconciler.clone())),
            reconciler,
        })
    }

    /// 从已装配的组件构造，测试时注入内存库
    pub fn from_parts(
        service: BackupService<HttpBackupGateway>,
        reconciler: StatusReconciler,
    ) -> Self {
        Self {
            service: Arc::new(service),
            reconciler,
        }
    }
}

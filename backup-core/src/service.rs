use crate::dao::StatusReconciler;
use crate::engine;
use crate::error::{BackupError, Result};
use crate::gateway::BackupApi;
use crate::resolver::ConfigResolver;
use crate::utils;
use crate::validation::{BatchParams, BatchRequest, validate_batch_params};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 备份编排服务
///
/// 一次调用跑完整条工作流：校验 -> 解析配置 -> 起始落库 ->
/// 决策并调用网关 -> 终态落库。三个阶段严格顺序执行，不同
/// 工作流之间没有共享可变状态。
#[derive(Debug, Clone)]
pub struct BackupService<G> {
    resolver: Arc<ConfigResolver>,
    gateway: G,
    reconciler: StatusReconciler,
}

impl<G: BackupApi> BackupService<G> {
    pub fn new(resolver: Arc<ConfigResolver>, gateway: G, reconciler: StatusReconciler) -> Self {
        Self {
            resolver,
            gateway,
            reconciler,
        }
    }

    /// 处理一次备份请求
    ///
    /// 校验失败和配置缺失在任何写入之前终止；网关失败和增量
    /// 前置条件失败仍然把尝试记录翻成 FAILED，不让记录悬在
    /// IN_PROGRESS。
    pub async fn process(&self, params: &BatchParams) -> Result<()> {
        let request = validate_batch_params(params)?;
        let target = self.resolver.resolve(&request.category_code)?;
        let business_date = self.extract_business_date(&request).await?;

        self.reconciler
            .record_start(
                &request.batch_id,
                &request.category_code,
                &target.backup_category_type,
                &business_date,
            )
            .await?;

        match engine::run_backup(&self.gateway, target).await {
            Ok(response) => {
                self.reconciler
                    .record_success(&request.batch_id, &business_date, &response.to_string())
                    .await;
                info!("备份流程完成: batch_id={}", request.batch_id);
                Ok(())
            }
            Err(e) => {
                error!("备份执行失败: batch_id={}, {}", request.batch_id, e);
                self.reconciler
                    .record_failure(&request.batch_id, &business_date, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// 从批次执行记录取业务日期
    ///
    /// 批次执行记录由批处理框架在调度时写入；这里只读。
    async fn extract_business_date(&self, request: &BatchRequest) -> Result<String> {
        let record = self
            .reconciler
            .get_batch_details(&request.batch_id, &request.category_code)
            .await?
            .ok_or_else(|| {
                BackupError::persistence(format!("未找到批次执行记录: {}", request.batch_id))
            })?;

        let business_date = utils::to_business_date(&record.execution_date);
        if utils::parse_business_date(&business_date).is_none() {
            warn!(
                "批次执行日期无法解析为业务日期: batch_id={}, date={}",
                request.batch_id, record.execution_date
            );
        }

        Ok(business_date)
    }
}

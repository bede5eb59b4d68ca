use crate::config::ApiConfig;
use crate::constants::{api, backup};
use crate::error::{BackupError, Result};
use crate::resolver::BackupTarget;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error};

/// 备份管理接口的三个操作
///
/// 留出 trait 接缝，编排层对接口只认这三个操作，测试时可以换成
/// 录制调用的假实现。
#[allow(async_fn_in_trait)]
pub trait BackupApi {
    /// 查询目标最近一次备份（按创建时间倒序取一条）
    async fn fetch_last_backup(&self, target: &BackupTarget) -> Result<BackupPage>;

    /// 提交全量备份请求
    async fn submit_full_backup(&self, target: &BackupTarget) -> Result<serde_json::Value>;

    /// 提交增量备份请求，base_backup_uuid 必须是本次流程刚解析出的值
    async fn submit_incremental_backup(
        &self,
        target: &BackupTarget,
        base_backup_uuid: &str,
    ) -> Result<serde_json::Value>;
}

/// 全量备份请求体
#[derive(Debug, Clone, Serialize)]
pub struct FullBackupRequest {
    #[serde(rename = "storageConfigUUID")]
    pub storage_config_uuid: String,
    pub sse: bool,
    #[serde(rename = "backupType")]
    pub backup_type: String,
    #[serde(rename = "backupCategory")]
    pub backup_category: String,
    #[serde(rename = "universeUUID")]
    pub universe_uuid: String,
    #[serde(rename = "timeBeforeDelete")]
    pub time_before_delete: i64,
    #[serde(rename = "expiryTimeUnit")]
    pub expiry_time_unit: String,
    #[serde(rename = "keyspaceTableList")]
    pub keyspace_table_list: Vec<KeyspaceTable>,
}

/// 增量备份请求体
///
/// 与全量请求同形，但去掉独立的过期字段，换成基线备份ID。
#[derive(Debug, Clone, Serialize)]
pub struct IncrementalBackupRequest {
    #[serde(rename = "storageConfigUUID")]
    pub storage_config_uuid: String,
    pub sse: bool,
    #[serde(rename = "backupType")]
    pub backup_type: String,
    #[serde(rename = "backupCategory")]
    pub backup_category: String,
    #[serde(rename = "universeUUID")]
    pub universe_uuid: String,
    #[serde(rename = "baseBackupUUID")]
    pub base_backup_uuid: String,
    #[serde(rename = "keyspaceTableList")]
    pub keyspace_table_list: Vec<KeyspaceTable>,
}

/// 最近备份查询请求体
#[derive(Debug, Clone, Serialize)]
pub struct LastBackupRequest {
    #[serde(rename = "storageConfigUUID")]
    pub storage_config_uuid: String,
    pub sse: bool,
    #[serde(rename = "backupType")]
    pub backup_type: String,
    #[serde(rename = "backupCategory")]
    pub backup_category: String,
    pub direction: String,
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    #[serde(rename = "timeBeforeDelete")]
    pub time_before_delete: i64,
    #[serde(rename = "expiryTimeUnit")]
    pub expiry_time_unit: String,
    pub filter: LastBackupFilter,
    pub limit: u32,
}

/// 最近备份查询的目标过滤条件
#[derive(Debug, Clone, Serialize)]
pub struct LastBackupFilter {
    #[serde(rename = "universeUUIDList")]
    pub universe_uuid_list: Vec<String>,
}

/// 单个 keyspace 条目
#[derive(Debug, Clone, Serialize)]
pub struct KeyspaceTable {
    pub keyspace: String,
}

/// 最近备份查询响应
///
/// 响应文档按字段名解码，baseBackupUUID 缺失时是类型化的 None，
/// 不做运行时路径查找。
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackupPage {
    #[serde(default)]
    pub entities: Vec<BackupEntity>,
}

/// 响应里的单条备份记录
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackupEntity {
    #[serde(rename = "commonBackupInfo", default)]
    pub common_backup_info: Option<CommonBackupInfo>,
}

/// 备份公共信息
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CommonBackupInfo {
    #[serde(rename = "baseBackupUUID", default)]
    pub base_backup_uuid: Option<String>,
}

impl FullBackupRequest {
    pub fn from_target(target: &BackupTarget) -> Self {
        Self {
            storage_config_uuid: target.storage_config_uuid.clone(),
            sse: false,
            backup_type: target.backup_type.clone(),
            backup_category: backup::BACKUP_CATEGORY.to_string(),
            universe_uuid: target.universe_uuid.clone(),
            time_before_delete: target.expiry_ms,
            expiry_time_unit: backup::EXPIRY_TIME_UNIT.to_string(),
            keyspace_table_list: vec![KeyspaceTable {
                keyspace: target.db_name.clone(),
            }],
        }
    }
}

impl IncrementalBackupRequest {
    pub fn from_target(target: &BackupTarget, base_backup_uuid: &str) -> Self {
        Self {
            storage_config_uuid: target.storage_config_uuid.clone(),
            sse: false,
            backup_type: target.backup_type.clone(),
            backup_category: backup::BACKUP_CATEGORY.to_string(),
            universe_uuid: target.universe_uuid.clone(),
            base_backup_uuid: base_backup_uuid.to_string(),
            keyspace_table_list: vec![KeyspaceTable {
                keyspace: target.db_name.clone(),
            }],
        }
    }
}

impl LastBackupRequest {
    pub fn from_target(target: &BackupTarget) -> Self {
        Self {
            storage_config_uuid: target.storage_config_uuid.clone(),
            sse: false,
            backup_type: target.backup_type.clone(),
            backup_category: backup::BACKUP_CATEGORY.to_string(),
            direction: backup::SORT_DIRECTION.to_string(),
            sort_by: backup::SORT_BY.to_string(),
            time_before_delete: target.expiry_ms,
            expiry_time_unit: backup::EXPIRY_TIME_UNIT.to_string(),
            filter: LastBackupFilter {
                universe_uuid_list: vec![target.universe_uuid.clone()],
            },
            limit: backup::LAST_BACKUP_LIMIT,
        }
    }
}

/// 备份管理接口客户端
///
/// 三个操作都是一次 POST，带令牌请求头，失败不在这里重试；
/// 重试策略属于外层批处理框架。
#[derive(Debug, Clone)]
pub struct HttpBackupGateway {
    client: Client,
}

impl HttpBackupGateway {
    /// 创建客户端，连接超时与响应超时都有上界，不会悬挂
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| BackupError::gateway(format!("构建 HTTP 客户端失败: {e}")))?;

        Ok(Self { client })
    }

    /// 按接口配置创建客户端
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            Duration::from_millis(config.connect_timeout_ms),
            Duration::from_millis(config.read_timeout_ms),
        )
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        api_token: &str,
        body: &B,
    ) -> Result<T> {
        debug!("请求备份管理接口: POST {}", url);

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .header(api::AUTH_TOKEN_HEADER, api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| BackupError::gateway(format!("请求 {url} 失败: {e}")))?;

        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| BackupError::gateway(format!("解析 {url} 响应失败: {e}")))
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("备份管理接口返回错误: {} - {}", status, text);
            Err(BackupError::gateway(format!("{status} - {text}")))
        }
    }
}

impl BackupApi for HttpBackupGateway {
    async fn fetch_last_backup(&self, target: &BackupTarget) -> Result<BackupPage> {
        let body = LastBackupRequest::from_target(target);
        self.post_json(&target.last_backup_url, &target.api_token, &body)
            .await
    }

    async fn submit_full_backup(&self, target: &BackupTarget) -> Result<serde_json::Value> {
        let body = FullBackupRequest::from_target(target);
        self.post_json(&target.full_backup_url, &target.api_token, &body)
            .await
    }

    async fn submit_incremental_backup(
        &self,
        target: &BackupTarget,
        base_backup_uuid: &str,
    ) -> Result<serde_json::Value> {
        let body = IncrementalBackupRequest::from_target(target, base_backup_uuid);
        self.post_json(&target.incremental_backup_url, &target.api_token, &body)
            .await
    }
}

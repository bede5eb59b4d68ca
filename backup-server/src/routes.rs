use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use backup_core::BackupError;
use backup_core::constants::{fields, status};
use backup_core::validation::{BatchParams, BatchRequest, validate_batch_params};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// 批次处理确认响应
///
/// 调用方是批处理框架：不论成功失败都回 HTTP 200，
/// 结果写在 executionStatus 里，错误细节放进扩展字段。
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchStartResponse {
    #[serde(rename = "executionStatus")]
    pub execution_status: String,
    #[serde(rename = "extensionFields", skip_serializing_if = "Option::is_none")]
    pub extension_fields: Option<serde_json::Value>,
}

impl BatchStartResponse {
    pub fn completed() -> Self {
        Self {
            execution_status: status::BATCH_COMPLETED.to_string(),
            extension_fields: None,
        }
    }

    pub fn failed(detail: &str) -> Self {
        Self {
            execution_status: status::BATCH_FAILED.to_string(),
            extension_fields: Some(serde_json::json!({ (fields::ERROR_MESSAGE): detail })),
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// 构建路由表
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/backupProcess", post(backup_process))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}

/// 备份流程入口
///
/// 代行批处理框架职责：校验批次参数、登记批次执行记录，
/// 再交给核心服务跑工作流。请求体缺失按全空参数处理，
/// 走统一的校验失败确认。
async fn backup_process(
    State(state): State<AppState>,
    payload: Option<Json<BatchParams>>,
) -> Json<BatchStartResponse> {
    let started = Instant::now();
    let params = payload.map(|Json(params)| params).unwrap_or_default();

    // 框架自己的参数门：校验不过不登记任何记录
    let request = match validate_batch_params(&params) {
        Ok(request) => request,
        Err(e) => {
            error!("批次参数校验失败: {}", e);
            return Json(BatchStartResponse::failed(&e.to_string()));
        }
    };

    info!(
        "收到备份请求: batch_id={}, category_code={}",
        request.batch_id, request.category_code
    );

    if let Err(e) = ensure_batch_registered(&state, &request.batch_id, &request.category_code).await
    {
        error!("登记批次执行记录失败: batch_id={}, {}", request.batch_id, e);
        return Json(BatchStartResponse::failed(fields::ERROR_DETAIL));
    }

    let response = match state.service.process(&params).await {
        Ok(()) => BatchStartResponse::completed(),
        Err(e) => {
            settle_stuck_batch(&state, &request, &e).await;
            if e.is_expected() {
                BatchStartResponse::failed(&e.to_string())
            } else {
                BatchStartResponse::failed(fields::ERROR_DETAIL)
            }
        }
    };

    info!(
        "备份请求处理完成: batch_id={}, status={}, 耗时={}ms",
        request.batch_id,
        response.execution_status,
        started.elapsed().as_millis()
    );
    Json(response)
}

/// 批次执行记录不存在时以当天为执行日期登记
async fn ensure_batch_registered(
    state: &AppState,
    batch_id: &str,
    category_code: &str,
) -> backup_core::Result<()> {
    if state
        .reconciler
        .get_batch_details(batch_id, category_code)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let execution_date = Local::now().format("%Y-%m-%d").to_string();
    state
        .reconciler
        .register_batch_execution(batch_id, category_code, &execution_date)
        .await
}

/// 起始记录之前流程失败时核心不写终态，这里检查刚登记的批次行，
/// 仍停在 IN_PROGRESS 就补成 FAILED（尽力而为）
async fn settle_stuck_batch(state: &AppState, request: &BatchRequest, error: &BackupError) {
    match state
        .reconciler
        .get_batch_details(&request.batch_id, &request.category_code)
        .await
    {
        Ok(Some(record)) if record.status == status::BACKUP_IN_PROGRESS => {
            state
                .reconciler
                .mark_batch_failed(&request.batch_id, &error.to_string())
                .await;
        }
        Ok(_) => {}
        Err(e) => error!("读取批次执行记录失败: batch_id={}, {}", request.batch_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use backup_core::dao::StatusReconciler;
    use backup_core::db::DbManager;
    use backup_core::gateway::HttpBackupGateway;
    use backup_core::resolver::ConfigResolver;
    use backup_core::service::BackupService;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let config = backup_core::config::AppConfig {
            server: Default::default(),
            database: Default::default(),
            api: Default::default(),
            databases: Default::default(),
        };
        let resolver = Arc::new(ConfigResolver::from_config(&config).unwrap());
        let gateway =
            HttpBackupGateway::new(Duration::from_millis(100), Duration::from_millis(100)).unwrap();
        let db = DbManager::new_memory().await.unwrap();
        let reconciler = StatusReconciler::new(db);
        AppState::from_parts(
            BackupService::new(resolver, gateway, reconciler.clone()),
            reconciler,
        )
    }

    async fn read_ack(response: axum::response::Response) -> BatchStartResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_params_acks_failed_with_http_200() {
        let app = router(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/backupProcess")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let ack = read_ack(response).await;
        assert_eq!(ack.execution_status, "FAILED");
        assert!(ack.extension_fields.is_some());
    }

    #[tokio::test]
    async fn test_empty_body_treated_as_missing_params() {
        let app = router(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/backupProcess")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let ack = read_ack(response).await;
        assert_eq!(ack.execution_status, "FAILED");
    }

    #[tokio::test]
    async fn test_unknown_category_flips_batch_row_to_failed() {
        let state = test_state().await;
        let app = router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/backupProcess")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"batch_id":"B-2","batchCategoryCode":"NOT_CONFIGURED"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let ack = read_ack(response).await;
        assert_eq!(ack.execution_status, "FAILED");

        // 刚登记的批次行不能停在 IN_PROGRESS
        let batch = state
            .reconciler
            .get_batch_details("B-2", "NOT_CONFIGURED")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batch.status, "FAILED");
        assert!(
            batch
                .extension_fields
                .as_deref()
                .unwrap()
                .contains("NOT_CONFIGURED")
        );
    }

    #[tokio::test]
    async fn test_unknown_category_acks_with_error_message() {
        let app = router(test_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/backupProcess")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"batch_id":"B-1","batchCategoryCode":"NOT_CONFIGURED"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let ack = read_ack(response).await;
        assert_eq!(ack.execution_status, "FAILED");
        let fields = ack.extension_fields.unwrap();
        assert!(
            fields["error_message"]
                .as_str()
                .unwrap()
                .contains("NOT_CONFIGURED")
        );
    }
}

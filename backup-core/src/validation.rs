use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};

/// 入站批次参数
///
/// 入站报文的两个必填字段都可能缺失，所以先用 Option 承接，
/// 校验通过后再转成 BatchRequest。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchParams {
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(rename = "batchCategoryCode", default)]
    pub category_code: Option<String>,
}

/// 校验通过的备份请求
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub batch_id: String,
    pub category_code: String,
}

/// 校验批次参数
///
/// 在任何数据库写入和外部调用之前执行；失败即终止，零副作用。
pub fn validate_batch_params(params: &BatchParams) -> Result<BatchRequest> {
    if params.batch_id.is_none() && params.category_code.is_none() {
        return Err(BackupError::validation("批次参数不能为空"));
    }

    let batch_id = required_param(&params.batch_id, "批次ID")?;
    let category_code = required_param(&params.category_code, "备份分类编码")?;

    Ok(BatchRequest {
        batch_id,
        category_code,
    })
}

fn required_param(value: &Option<String>, description: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(BackupError::validation(format!("{description}不能为空"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_params_pass() {
        let params = BatchParams {
            batch_id: Some("B-001".to_string()),
            category_code: Some("HWA_FULL".to_string()),
        };

        let request = validate_batch_params(&params).unwrap();
        assert_eq!(request.batch_id, "B-001");
        assert_eq!(request.category_code, "HWA_FULL");
    }

    #[test]
    fn test_empty_params_rejected() {
        let result = validate_batch_params(&BatchParams::default());
        assert!(matches!(result, Err(BackupError::Validation(_))));
    }

    #[test]
    fn test_missing_batch_id_rejected() {
        let params = BatchParams {
            batch_id: None,
            category_code: Some("HWA_FULL".to_string()),
        };

        let result = validate_batch_params(&params);
        assert!(matches!(result, Err(BackupError::Validation(msg)) if msg.contains("批次ID")));
    }

    #[test]
    fn test_blank_category_code_rejected() {
        let params = BatchParams {
            batch_id: Some("B-001".to_string()),
            category_code: Some("   ".to_string()),
        };

        let result = validate_batch_params(&params);
        assert!(matches!(result, Err(BackupError::Validation(_))));
    }

    #[test]
    fn test_inbound_json_field_names() {
        let params: BatchParams =
            serde_json::from_str(r#"{"batch_id":"B-7","batchCategoryCode":"HWA_INCR"}"#).unwrap();

        assert_eq!(params.batch_id.as_deref(), Some("B-7"));
        assert_eq!(params.category_code.as_deref(), Some("HWA_INCR"));
    }
}

use crate::constants::date;
use chrono::NaiveDate;
use tracing::error;

/// 把批次执行日期（yyyy-MM-dd）转成业务日期（yyyyMMdd）
pub fn to_business_date(execution_date: &str) -> String {
    execution_date.replace('-', "")
}

/// 解析业务日期字符串
///
/// 解析失败记日志并返回 None，与上游落库时的空日期语义一致。
pub fn parse_business_date(business_date: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(business_date, date::BUSINESS_DATE_PATTERN) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            error!("业务日期解析失败: {} - {}", business_date, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_business_date_strips_dashes() {
        assert_eq!(to_business_date("2026-08-30"), "20260830");
        assert_eq!(to_business_date("20260830"), "20260830");
    }

    #[test]
    fn test_parse_business_date() {
        let parsed = parse_business_date("20260830").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2026, 8, 30).unwrap());

        assert!(parse_business_date("2026-08-30").is_none());
        assert!(parse_business_date("not-a-date").is_none());
    }
}

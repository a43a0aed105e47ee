// ==========================================
// 任务导入服务 - 字段解析
// ==========================================
// 职责: 原始单元格文本 → 整数 / 小数 / 日期
// 日期: 按固定优先级尝试多种格式，命中第一个即返回
// ==========================================

use crate::importer::error::FormatError;
use chrono::NaiveDate;
use tracing::debug;

/// 日期格式（按优先级）：DD/MM/YYYY, YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD
pub const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// 解析整数
pub fn parse_integer(text: &str) -> Result<i32, FormatError> {
    let value = text.trim();
    value.parse::<i32>().map_err(|e| {
        debug!(value = %value, error = %e, "整数解析失败");
        FormatError::InvalidInteger(value.to_string())
    })
}

/// 解析小数（拒绝 NaN / inf）
pub fn parse_decimal(text: &str) -> Result<f64, FormatError> {
    let value = text.trim();
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => {
            debug!(value = %value, "小数解析失败: 非有限值");
            Err(FormatError::InvalidDecimal(value.to_string()))
        }
        Err(e) => {
            debug!(value = %value, error = %e, "小数解析失败");
            Err(FormatError::InvalidDecimal(value.to_string()))
        }
    }
}

/// 解析日期
///
/// 错误信息只提示 DD/MM/YYYY，但其余三种格式同样接受。
pub fn parse_date(text: &str) -> Result<NaiveDate, FormatError> {
    let value = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            debug!(value = %value, "日期解析失败");
            FormatError::InvalidDate(value.to_string())
        })
}

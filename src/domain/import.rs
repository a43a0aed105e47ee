// ==========================================
// 任务导入服务 - 导入结果模型
// ==========================================
// 职责: 导入统计 / 导入结果 / 导入状态机阶段
// 说明: ImportResult 直接序列化为 HTTP 响应体
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MESSAGE_IMPORT_SUCCEEDED: &str = "Import completed successfully";
pub const MESSAGE_IMPORT_PARTIAL: &str = "Import completed with errors";
pub const MESSAGE_IMPORT_FAILED: &str = "Import failed";

// ==========================================
// ImportStatistics - 导入统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatistics {
    pub total_processed: usize, // 提取器看到的数据行数（不含表头）
    pub success_count: usize,   // 成功落库的记录数
    pub error_count: usize,     // 错误条数
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
}

impl ImportStatistics {
    /// 在导入开始时创建
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            total_processed: 0,
            success_count: 0,
            error_count: 0,
            start_time: now,
            end_time: now,
            duration_ms: 0,
        }
    }

    /// 记录结束时间与耗时（每个终态调用一次）
    pub fn finish(&mut self) {
        self.end_time = Utc::now();
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds().max(0);
    }
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 用途: 单次导入的唯一产出，构造后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub imported_at: DateTime<Utc>,
    pub total_entries: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub stats: ImportStatistics,
}

impl ImportResult {
    /// 全部成功
    pub fn succeeded(total_entries: usize, stats: ImportStatistics) -> Self {
        Self {
            success: true,
            message: MESSAGE_IMPORT_SUCCEEDED.to_string(),
            imported_at: Utc::now(),
            total_entries,
            errors: Vec::new(),
            stats,
        }
    }

    /// 部分成功（仅在允许部分导入时出现）
    pub fn partially_succeeded(
        total_entries: usize,
        errors: Vec<String>,
        stats: ImportStatistics,
    ) -> Self {
        Self {
            success: true,
            message: MESSAGE_IMPORT_PARTIAL.to_string(),
            imported_at: Utc::now(),
            total_entries,
            errors,
            stats,
        }
    }

    /// 失败（任意失败终态）
    pub fn failed(errors: Vec<String>, stats: ImportStatistics) -> Self {
        Self {
            success: false,
            message: MESSAGE_IMPORT_FAILED.to_string(),
            imported_at: Utc::now(),
            total_entries: stats.total_processed,
            errors,
            stats,
        }
    }
}

// ==========================================
// ImportStage - 导入状态机
// ==========================================
// Start → Extracting → (ExtractFailed | Validating)
//       → (ValidateFailed | Persisting) → (PersistFailed | Succeeded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    Start,
    Extracting,
    ExtractFailed,
    Validating,
    ValidateFailed,
    Persisting,
    PersistFailed,
    Succeeded,
}

impl ImportStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ImportStage::ExtractFailed
                | ImportStage::ValidateFailed
                | ImportStage::PersistFailed
                | ImportStage::Succeeded
        )
    }

    /// 失败终态对应的前一阶段
    pub fn failure_of(self) -> Option<ImportStage> {
        match self {
            ImportStage::Extracting => Some(ImportStage::ExtractFailed),
            ImportStage::Validating => Some(ImportStage::ValidateFailed),
            ImportStage::Persisting => Some(ImportStage::PersistFailed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportStage::Start => "start",
            ImportStage::Extracting => "extracting",
            ImportStage::ExtractFailed => "extract_failed",
            ImportStage::Validating => "validating",
            ImportStage::ValidateFailed => "validate_failed",
            ImportStage::Persisting => "persisting",
            ImportStage::PersistFailed => "persist_failed",
            ImportStage::Succeeded => "succeeded",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_uses_processed_rows() {
        let mut stats = ImportStatistics::start();
        stats.total_processed = 4;
        stats.error_count = 1;
        stats.finish();

        let result = ImportResult::failed(vec!["boom".to_string()], stats);
        assert!(!result.success);
        assert_eq!(result.message, MESSAGE_IMPORT_FAILED);
        assert_eq!(result.total_entries, 4);
        assert!(result.stats.end_time >= result.stats.start_time);
    }

    #[test]
    fn test_errors_omitted_when_empty() {
        let result = ImportResult::succeeded(3, ImportStatistics::start());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["total_entries"], 3);
        assert_eq!(json["stats"]["success_count"], 0);
    }

    #[test]
    fn test_stage_failure_mapping() {
        assert_eq!(
            ImportStage::Extracting.failure_of(),
            Some(ImportStage::ExtractFailed)
        );
        assert_eq!(ImportStage::Succeeded.failure_of(), None);
        assert!(ImportStage::PersistFailed.is_terminal());
        assert!(!ImportStage::Validating.is_terminal());
    }
}

// ==========================================
// 任务导入服务 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: FormatError（字段级）/ 结构错误（文件级）/ 校验错误 / 持久化错误
// 说明: 错误文本会原样出现在 ImportResult.errors 中，保持英文
// ==========================================

use crate::domain::import::{ImportResult, ImportStage};
use crate::domain::types::TaskField;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 单字段解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid integer value {0:?}")]
    InvalidInteger(String),

    #[error("invalid decimal value {0:?}")]
    InvalidDecimal(String),

    #[error("date must be in DD/MM/YYYY format, got {0:?}")]
    InvalidDate(String),
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件级错误（致命，不再处理任何数据行）=====
    #[error("import directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("no input files found in directory: {0}")]
    NoInputFiles(String),

    #[error("unsupported file format: {0} (expected .csv/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("failed to read input file: {0}")]
    FileReadError(String),

    #[error("failed to parse CSV: {0}")]
    CsvParseError(String),

    #[error("failed to parse spreadsheet: {0}")]
    ExcelParseError(String),

    #[error("input file is empty")]
    EmptyFile,

    #[error("invalid file format: missing required columns (got {found}). Expected: {expected}")]
    MissingColumns { found: usize, expected: String },

    #[error("invalid file format: invalid header at column {column}. Expected: {expected}, Got: {actual}")]
    HeaderMismatch {
        column: usize,
        expected: String,
        actual: String,
    },

    // ===== 行级错误（收集后统一返回）=====
    #[error("row {row} has insufficient columns (expected {expected}, got {actual}; line {line})")]
    InsufficientColumns {
        row: usize,
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {field} at row {row} (line {line}): {source}")]
    FieldFormat {
        row: usize,
        line: usize,
        field: TaskField,
        #[source]
        source: FormatError,
    },

    #[error("failed to read entries from input file: {0} row error(s)")]
    RowErrors(usize),

    // ===== 校验错误（遇到第一条即停止）=====
    #[error("validation failed for row {row}: invalid {field}: {message}")]
    Validation {
        row: usize,
        field: TaskField,
        message: String,
    },

    // ===== 持久化错误（整批回滚）=====
    #[error("failed to import entries: {0}")]
    Persist(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 是否为单行错误（提取阶段收集，不中止文件）
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            ImportError::InsufficientColumns { .. }
                | ImportError::FieldFormat { .. }
                | ImportError::Validation { .. }
        )
    }

    /// 出错的数据行号（1 起，不含表头）
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::InsufficientColumns { row, .. }
            | ImportError::FieldFormat { row, .. }
            | ImportError::Validation { row, .. } => Some(*row),
            ImportError::Persist(RepositoryError::RowInsertFailed { row, .. }) => Some(*row),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;

// ==========================================
// ImportFailure - 导入失败（控制流信号 + 结构化结果）
// ==========================================
#[derive(Error, Debug)]
#[error("import failed at {stage}: {error}")]
pub struct ImportFailure {
    pub stage: ImportStage, // 到达的失败终态
    #[source]
    pub error: ImportError,
    pub result: ImportResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_scoped_messages() {
        let err = ImportError::InsufficientColumns {
            row: 4,
            line: 5,
            expected: 9,
            actual: 3,
        };
        assert!(err.is_row_scoped());
        assert_eq!(err.row(), Some(4));
        assert!(err.to_string().starts_with("row 4 has insufficient columns"));

        let err = ImportError::FieldFormat {
            row: 2,
            line: 3,
            field: TaskField::Age,
            source: FormatError::InvalidInteger("abc".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "invalid age at row 2 (line 3): invalid integer value \"abc\""
        );
    }

    #[test]
    fn test_persist_error_carries_row() {
        let err = ImportError::from(RepositoryError::RowInsertFailed {
            row: 5,
            message: "constraint failed".to_string(),
        });
        assert_eq!(err.row(), Some(5));
        assert!(!err.is_row_scoped());
        assert!(err.to_string().contains("row 5"));
    }

    #[test]
    fn test_file_scoped_is_not_row_scoped() {
        let err = ImportError::HeaderMismatch {
            column: 3,
            expected: "Age".to_string(),
            actual: "Years".to_string(),
        };
        assert!(!err.is_row_scoped());
        assert_eq!(err.row(), None);
    }
}

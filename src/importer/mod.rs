// ==========================================
// 任务导入服务 - 导入层
// ==========================================
// 职责: 外部文件导入,生成任务记录
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod discovery;
pub mod error;
pub mod field_parser;
pub mod file_parser;
pub mod record_extractor;
pub mod row_validator;
pub mod task_importer_impl;
pub mod task_importer_trait;

// 重导出核心类型
pub use error::{FormatError, ImportError, ImportFailure, ImporterResult};
pub use file_parser::{CsvParser, ExcelParser, RawRow, UniversalFileParser};
pub use record_extractor::{Extraction, RecordExtractor};
pub use row_validator::{FieldViolation, TaskRowValidator};
pub use task_importer_impl::TaskImporterImpl;

// 重导出 Trait 接口
pub use task_importer_trait::{FileParser, RowValidator, TaskImporter};

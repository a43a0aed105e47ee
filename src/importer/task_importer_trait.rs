// ==========================================
// 任务导入服务 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::import::ImportResult;
use crate::domain::task::ImportRecord;
use crate::importer::error::{ImportFailure, ImporterResult};
use crate::importer::file_parser::RawRow;
use crate::importer::row_validator::FieldViolation;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// TaskImporter Trait
// ==========================================
// 用途: 任务导入主接口
// 实现者: TaskImporterImpl
#[async_trait]
pub trait TaskImporter: Send + Sync {
    /// 对配置的导入目录执行一次导入
    ///
    /// # 返回
    /// - Ok(ImportResult): 导入成功（或允许部分导入时的部分成功）
    /// - Err(ImportFailure): 失败终态 + 结构化结果（不会是裸错误）
    ///
    /// # 导入流程
    /// 1. 提取（发现文件 → 解析 → 表头校验 → 行映射，收集行级错误）
    /// 2. 校验（遇到第一条非法记录即停止）
    /// 3. 落库（单事务，全部成功或全部回滚）
    async fn import(&self) -> Result<ImportResult, ImportFailure>;

    /// 对指定目录执行一次导入
    async fn import_from(&self, dir: &Path) -> Result<ImportResult, ImportFailure>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行（含表头）
    fn parse_rows(&self, file_path: &Path) -> ImporterResult<Vec<RawRow>>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 记录语义校验
// 实现者: TaskRowValidator
pub trait RowValidator: Send + Sync {
    /// 校验单条记录，返回第一个违规字段
    fn validate_one(&self, record: &ImportRecord) -> Result<(), FieldViolation>;

    /// 校验整批记录，遇到第一条非法记录即返回
    ///
    /// row_numbers 与 records 一一对应，为错误中报告的数据行号；
    /// 缺失时按批内位置（1 起）报告
    fn validate_batch(
        &self,
        records: &[ImportRecord],
        row_numbers: &[usize],
    ) -> ImporterResult<()>;
}

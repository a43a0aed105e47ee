// ==========================================
// 任务导入服务 - 记录提取器
// ==========================================
// 职责: 发现文件 → 解析 → 表头校验 → 行映射为 ImportRecord
// 策略: 文件级错误立即返回；行级错误全部收集，不中止文件
// ==========================================

use crate::domain::task::ImportRecord;
use crate::domain::types::{TaskField, EXPECTED_HEADERS, REQUIRED_COLUMNS};
use crate::importer::discovery::discover_input_file;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_parser::{parse_date, parse_decimal, parse_integer};
use crate::importer::file_parser::RawRow;
use crate::importer::task_importer_trait::FileParser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

// ==========================================
// Extraction - 提取结果
// ==========================================
#[derive(Debug)]
pub struct Extraction {
    pub source_file: PathBuf,
    pub records: Vec<ImportRecord>,
    pub row_numbers: Vec<usize>,      // 与 records 一一对应的数据行号（1 起）
    pub row_errors: Vec<ImportError>, // 仅包含行级错误
    pub rows_seen: usize,             // 非空数据行数（不含表头）
}

impl Extraction {
    pub fn has_errors(&self) -> bool {
        !self.row_errors.is_empty()
    }

    /// 批内第 position 条（1 起）记录对应的数据行号
    pub fn row_number_at(&self, position: usize) -> usize {
        position
            .checked_sub(1)
            .and_then(|idx| self.row_numbers.get(idx).copied())
            .unwrap_or(position)
    }
}

// ==========================================
// RecordExtractor
// ==========================================
pub struct RecordExtractor {
    parser: Box<dyn FileParser>,
    extensions: Vec<String>,
}

impl RecordExtractor {
    pub fn new(parser: Box<dyn FileParser>, extensions: Vec<String>) -> Self {
        Self { parser, extensions }
    }

    /// 从导入目录提取记录
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn extract(&self, dir: &Path) -> ImporterResult<Extraction> {
        let file = discover_input_file(dir, &self.extensions)?;
        self.extract_file(&file)
    }

    /// 从指定文件提取记录
    pub fn extract_file(&self, file: &Path) -> ImporterResult<Extraction> {
        let rows = self.parser.parse_rows(file)?;
        let extraction = extract_rows(file, rows)?;

        info!(
            file = %file.display(),
            rows_seen = extraction.rows_seen,
            entry_count = extraction.records.len(),
            error_count = extraction.row_errors.len(),
            "记录提取完成"
        );

        Ok(extraction)
    }
}

/// 原始行 → 提取结果
///
/// 第一行为表头；数据行号从 1 开始，空白行跳过但占用行号。
pub fn extract_rows(source_file: &Path, rows: Vec<RawRow>) -> ImporterResult<Extraction> {
    let mut rows = rows.into_iter();
    let header = rows.next().ok_or(ImportError::EmptyFile)?;
    validate_header(&header)?;

    let mut records = Vec::new();
    let mut row_numbers = Vec::new();
    let mut errors = Vec::new();
    let mut rows_seen = 0;

    for (idx, row) in rows.enumerate() {
        let row_number = idx + 1;
        if row.is_blank() {
            debug!(row_number, line = row.line, "跳过空白行");
            continue;
        }
        rows_seen += 1;

        match map_row(&row, row_number) {
            Ok(record) => {
                records.push(record);
                row_numbers.push(row_number);
            }
            Err(e) => {
                warn!(row_number, line = row.line, error = %e, "数据行提取失败");
                errors.push(e);
            }
        }
    }

    Ok(Extraction {
        source_file: source_file.to_path_buf(),
        records,
        row_numbers,
        row_errors: errors,
        rows_seen,
    })
}

/// 表头校验：至少 9 列，顺序固定，忽略大小写
pub fn validate_header(header: &RawRow) -> ImporterResult<()> {
    if header.cells.len() < REQUIRED_COLUMNS {
        return Err(ImportError::MissingColumns {
            found: header.cells.len(),
            expected: EXPECTED_HEADERS.join(", "),
        });
    }

    for (idx, expected) in EXPECTED_HEADERS.iter().enumerate() {
        let actual = header.cells[idx].trim().trim_start_matches('\u{feff}');
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ImportError::HeaderMismatch {
                column: idx + 1,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
    }

    Ok(())
}

/// 单个数据行 → ImportRecord
fn map_row(row: &RawRow, row_number: usize) -> ImporterResult<ImportRecord> {
    if row.cells.len() < REQUIRED_COLUMNS {
        return Err(ImportError::InsufficientColumns {
            row: row_number,
            line: row.line,
            expected: REQUIRED_COLUMNS,
            actual: row.cells.len(),
        });
    }

    let text = |field: TaskField| row.cells[field.column_index()].trim().to_string();
    let field_error = |field: TaskField| {
        move |source| ImportError::FieldFormat {
            row: row_number,
            line: row.line,
            field,
            source,
        }
    };

    let age = parse_integer(&text(TaskField::Age)).map_err(field_error(TaskField::Age))?;
    let salary =
        parse_decimal(&text(TaskField::Salary)).map_err(field_error(TaskField::Salary))?;
    let hire_date =
        parse_date(&text(TaskField::HireDate)).map_err(field_error(TaskField::HireDate))?;

    Ok(ImportRecord {
        name: text(TaskField::Name),
        email: text(TaskField::Email),
        age,
        address: text(TaskField::Address),
        phone_number: text(TaskField::PhoneNumber),
        department: text(TaskField::Department),
        position: text(TaskField::Position),
        salary,
        hire_date,
    })
}

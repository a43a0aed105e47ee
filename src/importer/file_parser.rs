// ==========================================
// 任务导入服务 - 文件解析器实现
// ==========================================
// 职责: 文件 → 原始行（物理行号 + 单元格文本）
// 支持: CSV (.csv) / 电子表格 (.xlsx/.xls，取第一个工作表)
// 说明: 表头与数据行一视同仁，由提取器区分
// ==========================================

use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::task_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ==========================================
// RawRow - 原始行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize, // 物理行号（1 起）
    pub cells: Vec<String>,
}

impl RawRow {
    /// 所有单元格均为空
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// 去掉开头的 UTF-8 BOM
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从内存字节解析（BOM 已容忍）
    pub fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<Vec<RawRow>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .trim(Trim::All)
            .from_reader(strip_bom(bytes));

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 1);
            rows.push(RawRow {
                line,
                cells: record.iter().map(|v| v.to_string()).collect(),
            });
        }

        Ok(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImporterResult<Vec<RawRow>> {
        let bytes = std::fs::read(file_path)?;
        let rows = self.parse_bytes(&bytes)?;
        debug!(file = %file_path.display(), rows = rows.len(), "CSV 解析完成");
        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImporterResult<Vec<RawRow>> {
        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // Range 可能不从 A1 开始
        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        let rows: Vec<RawRow> = range
            .rows()
            .enumerate()
            .map(|(idx, cells)| RawRow {
                line: first_row + idx + 1,
                cells: cells.iter().map(cell_to_string).collect(),
            })
            .collect();

        debug!(
            file = %file_path.display(),
            sheet = %sheet_name,
            rows = rows.len(),
            "电子表格解析完成"
        );
        Ok(rows)
    }
}

/// 单元格 → 文本
///
/// 整数值的浮点数不带 `.0`；日期单元格输出 `YYYY-MM-DD`，再走统一的日期解析。
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_rows(&self, file_path: &Path) -> ImporterResult<Vec<RawRow>> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_rows(file_path),
            _ => Err(ImportError::UnsupportedFormat(
                file_path.display().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use std::io::Write;
    use tempfile::Builder;

    // 两个工作表：第一个表数据从 C4 开始，含数值与日期单元格
    fn write_workbook(path: &Path) {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let hired = ExcelDateTime::from_ymd(2021, 3, 15).unwrap();
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Tasks").unwrap();
        sheet.write_string(3, 2, "Name").unwrap();
        sheet.write_string(3, 3, "Age").unwrap();
        sheet.write_string(3, 4, "Salary").unwrap();
        sheet.write_string(3, 5, "Hire Date").unwrap();
        sheet.write_string(4, 2, " Alice ").unwrap();
        sheet.write_number(4, 3, 30.0).unwrap();
        sheet.write_number(4, 4, 52000.75).unwrap();
        sheet
            .write_datetime_with_format(4, 5, &hired, &date_format)
            .unwrap();

        let archive = workbook.add_worksheet();
        archive.set_name("Archive").unwrap();
        archive.write_string(0, 0, "Name").unwrap();
        archive.write_string(1, 0, "Mallory").unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_csv_parser_tracks_lines() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "Name,Email").unwrap();
        writeln!(temp_file, " Alice , a@x.io").unwrap();
        writeln!(temp_file, "\"Bob, Jr.\",b@x.io").unwrap();

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[1].cells, vec!["Alice", "a@x.io"]);
        assert_eq!(rows[2].line, 3);
        assert_eq!(rows[2].cells[0], "Bob, Jr.");
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Name,Email\nAlice,a@x.io\n");

        let rows = CsvParser.parse_bytes(&bytes).unwrap();
        assert_eq!(rows[0].cells[0], "Name");
    }

    #[test]
    fn test_csv_parser_allows_ragged_rows() {
        let rows = CsvParser.parse_bytes(b"a,b,c\n1,2\n1,2,3,4\n").unwrap();
        assert_eq!(rows[1].cells.len(), 2);
        assert_eq!(rows[2].cells.len(), 4);
    }

    #[test]
    fn test_csv_parser_empty_input() {
        assert!(CsvParser.parse_bytes(b"").unwrap().is_empty());
        assert!(CsvParser.parse_bytes(UTF8_BOM).unwrap().is_empty());
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileReadError(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse_rows(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_excel_parser_reads_first_sheet() {
        let temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        write_workbook(temp_file.path());

        let rows = ExcelParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells, vec!["Name", "Age", "Salary", "Hire Date"]);
        assert_eq!(rows[1].cells, vec!["Alice", "30", "52000.75", "2021-03-15"]);
        assert!(rows.iter().all(|r| !r.cells.iter().any(|c| c == "Mallory")));
    }

    #[test]
    fn test_excel_parser_offset_range_keeps_sheet_lines() {
        let temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        write_workbook(temp_file.path());

        let rows = UniversalFileParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows[0].line, 4);
        assert_eq!(rows[1].line, 5);
    }

    #[test]
    fn test_blank_row_detection() {
        let row = RawRow {
            line: 4,
            cells: vec!["".to_string(), "  ".to_string()],
        };
        assert!(row.is_blank());
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(42.0)), "42");
        assert_eq!(cell_to_string(&Data::Float(5000.5)), "5000.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String(" Sales ".to_string())), "Sales");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}

// ==========================================
// 任务导入服务 - 输入文件发现
// ==========================================
// 职责: 在导入目录中按扩展名查找输入文件
// 规则: 只处理普通文件，扩展名不区分大小写，按文件名排序后取第一个
// ==========================================

use crate::importer::error::{ImportError, ImporterResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 列出目录中扩展名匹配的所有文件（按文件名排序）
pub fn list_input_files(dir: &Path, extensions: &[String]) -> ImporterResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ImportError::DirectoryNotFound(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        // 跳过目录
        if !path.is_file() {
            continue;
        }

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);

        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// 选出本次导入要处理的文件
pub fn discover_input_file(dir: &Path, extensions: &[String]) -> ImporterResult<PathBuf> {
    let mut files = list_input_files(dir, extensions)?;

    if files.is_empty() {
        return Err(ImportError::NoInputFiles(dir.display().to_string()));
    }
    if files.len() > 1 {
        warn!(
            dir = %dir.display(),
            count = files.len(),
            "目录中存在多个输入文件，仅处理第一个"
        );
    }

    let file = files.remove(0);
    debug!(file = %file.display(), "选定输入文件");
    Ok(file)
}

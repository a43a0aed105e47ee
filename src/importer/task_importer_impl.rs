// ==========================================
// 任务导入服务 - 任务导入器实现
// ==========================================
// 职责: 串联 提取 → 校验 → 落库，组装统计与导入结果
// 状态: Start → Extracting → (ExtractFailed | Validating)
//       → (ValidateFailed | Persisting) → (PersistFailed | Succeeded)
// ==========================================

use crate::domain::import::{ImportResult, ImportStage, ImportStatistics};
use crate::importer::error::{ImportError, ImportFailure};
use crate::importer::record_extractor::{Extraction, RecordExtractor};
use crate::importer::task_importer_trait::{RowValidator, TaskImporter};
use crate::repository::{RepositoryError, TaskCommandRepository};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// TaskImporterImpl - 任务导入器实现
// ==========================================
pub struct TaskImporterImpl<R>
where
    R: TaskCommandRepository,
{
    // 数据访问层
    task_repo: R,

    // 导入组件
    extractor: Arc<RecordExtractor>,
    validator: Box<dyn RowValidator>,

    // 配置
    import_dir: PathBuf,
    allow_partial: bool,
}

impl<R> TaskImporterImpl<R>
where
    R: TaskCommandRepository,
{
    /// 创建新的 TaskImporter 实例
    ///
    /// # 参数
    /// - task_repo: 任务写入仓储
    /// - extractor: 记录提取器
    /// - validator: 记录校验器
    /// - import_dir: 默认导入目录
    pub fn new(
        task_repo: R,
        extractor: RecordExtractor,
        validator: Box<dyn RowValidator>,
        import_dir: PathBuf,
    ) -> Self {
        Self {
            task_repo,
            extractor: Arc::new(extractor),
            validator,
            import_dir,
            allow_partial: false,
        }
    }

    /// 开启部分导入：提取阶段的行级错误不再中止整个导入
    pub fn with_allow_partial(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }

    /// 在阻塞线程池中提取（文件读取与解析为同步操作）
    async fn extract_blocking(&self, dir: &Path) -> Result<Extraction, ImportError> {
        let extractor = Arc::clone(&self.extractor);
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || extractor.extract(&dir))
            .await
            .map_err(|e| ImportError::InternalError(format!("extraction task failed: {e}")))?
    }

    /// 将仓储报告的批内位置换算为数据行号
    fn map_persist_row(extraction: &Extraction, err: RepositoryError) -> RepositoryError {
        match err {
            RepositoryError::RowInsertFailed { row, message } => RepositoryError::RowInsertFailed {
                row: extraction.row_number_at(row),
                message,
            },
            other => other,
        }
    }

    /// 构造失败终态
    fn fail(
        stage: ImportStage,
        error: ImportError,
        errors: Vec<String>,
        mut stats: ImportStatistics,
    ) -> ImportFailure {
        let stage = stage.failure_of().unwrap_or(stage);
        stats.error_count = errors.len();
        stats.finish();

        error!(
            stage = %stage,
            error = %error,
            error_count = stats.error_count,
            duration_ms = stats.duration_ms,
            "导入失败"
        );

        ImportFailure {
            stage,
            error,
            result: ImportResult::failed(errors, stats),
        }
    }
}

#[async_trait]
impl<R> TaskImporter for TaskImporterImpl<R>
where
    R: TaskCommandRepository,
{
    async fn import(&self) -> Result<ImportResult, ImportFailure> {
        self.import_from(&self.import_dir).await
    }

    #[instrument(skip(self, dir), fields(run_id = %Uuid::new_v4(), dir = %dir.display()))]
    async fn import_from(&self, dir: &Path) -> Result<ImportResult, ImportFailure> {
        let mut stats = ImportStatistics::start();
        info!("开始导入任务数据");

        // ===== 阶段 1: 提取 =====
        let stage = ImportStage::Extracting;
        let extraction = match self.extract_blocking(dir).await {
            Ok(extraction) => extraction,
            Err(e) => {
                let errors = vec![e.to_string()];
                return Err(Self::fail(stage, e, errors, stats));
            }
        };
        stats.total_processed = extraction.rows_seen;

        let row_errors: Vec<String> = extraction
            .row_errors
            .iter()
            .map(ToString::to_string)
            .collect();

        if extraction.has_errors() {
            if !self.allow_partial || extraction.records.is_empty() {
                let summary = ImportError::RowErrors(row_errors.len());
                return Err(Self::fail(stage, summary, row_errors, stats));
            }
            warn!(
                error_count = row_errors.len(),
                entry_count = extraction.records.len(),
                "存在行级错误，按部分导入继续"
            );
        }

        let records = &extraction.records;
        info!(
            file = %extraction.source_file.display(),
            entry_count = records.len(),
            "进入校验阶段"
        );

        // ===== 阶段 2: 校验 =====
        let stage = ImportStage::Validating;
        if let Err(e) = self
            .validator
            .validate_batch(records, &extraction.row_numbers)
        {
            let mut errors = row_errors;
            errors.push(e.to_string());
            return Err(Self::fail(stage, e, errors, stats));
        }
        debug!("全部记录通过校验");

        // ===== 阶段 3: 落库 =====
        let stage = ImportStage::Persisting;
        let inserted = match self.task_repo.bulk_insert_tasks(records).await {
            Ok(count) => count,
            Err(e) => {
                let e = ImportError::from(Self::map_persist_row(&extraction, e));
                let mut errors = row_errors;
                errors.push(e.to_string());
                return Err(Self::fail(stage, e, errors, stats));
            }
        };

        // ===== 成功 =====
        stats.success_count = inserted;
        stats.error_count = row_errors.len();
        stats.finish();

        info!(
            stage = %ImportStage::Succeeded,
            entry_count = inserted,
            error_count = stats.error_count,
            duration_ms = stats.duration_ms,
            "导入完成"
        );

        if row_errors.is_empty() {
            Ok(ImportResult::succeeded(inserted, stats))
        } else {
            Ok(ImportResult::partially_succeeded(inserted, row_errors, stats))
        }
    }
}

// ==========================================
// 任务导入服务 - 应用状态
// ==========================================
// 职责: 组装仓储 / 导入器 / 查询服务 / 令牌管理器
// 说明: axum 路由共享状态，所有成员以 Arc 持有，可廉价 Clone
// ==========================================

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::{
    RecordExtractor, TaskImporter, TaskImporterImpl, TaskRowValidator, UniversalFileParser,
};
use crate::perf::install_sqlite_tracing;
use crate::repository::TaskRepositoryImpl;
use crate::service::TaskQueryService;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// 应用初始化错误
#[derive(Error, Debug)]
pub enum AppInitError {
    #[error("failed to open database {path}: {source}")]
    Database {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to prepare database schema: {0}")]
    Schema(#[source] rusqlite::Error),
}

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 启动配置（只读）
    pub config: Arc<AppConfig>,

    /// 任务导入器
    pub importer: Arc<dyn TaskImporter>,

    /// 任务查询服务
    pub query_service: Arc<TaskQueryService>,

    /// 令牌管理器
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开数据库 → 幂等建表 → 安装慢 SQL 观测 → 组装各组件
    pub fn new(config: AppConfig) -> Result<Self, AppInitError> {
        let db_path = config.database.resolved_path();
        tracing::info!(db_path = %db_path, "初始化AppState");

        let mut conn = open_sqlite_connection(&db_path, config.database.busy_timeout_ms)
            .map_err(|source| AppInitError::Database {
                path: db_path.clone(),
                source,
            })?;
        ensure_schema(&conn).map_err(AppInitError::Schema)?;
        install_sqlite_tracing(&mut conn, config.database.slow_sql_ms);

        Ok(Self::from_connection(config, Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接组装（连接须已完成建表）
    pub fn from_connection(config: AppConfig, conn: Arc<Mutex<Connection>>) -> Self {
        let task_repo = Arc::new(TaskRepositoryImpl::from_connection(conn));

        let extractor = RecordExtractor::new(
            Box::new(UniversalFileParser),
            config.import.extensions.clone(),
        );
        let importer = TaskImporterImpl::new(
            task_repo.clone(),
            extractor,
            Box::new(TaskRowValidator),
            config.import.directory.clone(),
        )
        .with_allow_partial(config.import.allow_partial);

        let query_service = TaskQueryService::new(task_repo);
        let jwt = JwtManager::from_config(&config.jwt);

        Self {
            config: Arc::new(config),
            importer: Arc::new(importer),
            query_service: Arc::new(query_service),
            jwt: Arc::new(jwt),
        }
    }
}

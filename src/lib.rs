// ==========================================
// 任务导入服务 - 核心库
// ==========================================
// 技术栈: axum + tokio + Rust + SQLite
// 系统定位: 表格文件批量导入任务数据，提供读侧查询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 启动配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// SQL 性能观测
pub mod perf;

// 日志系统
pub mod logging;

// 认证层 - 客户端令牌
pub mod auth;

// 服务层 - 读侧查询
pub mod service;

// API 层 - HTTP 路由
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ClientIdentity, ImportRecord, ImportResult, ImportStage, ImportStatistics, TaskField,
};

// 导入
pub use importer::{ImportError, ImportFailure, TaskImporter, TaskImporterImpl};

// 应用
pub use app::AppState;
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "任务导入服务";

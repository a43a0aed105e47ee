// ==========================================
// 任务导入服务 - 配置层
// ==========================================
// 职责: 启动配置加载（YAML + 环境变量覆写）
// ==========================================

pub mod app_config;

pub use app_config::{
    get_default_db_path, AppConfig, ConfigError, DatabaseConfig, ImportConfig, JwtConfig,
    LogFormat, LoggingConfig, ServerConfig,
};

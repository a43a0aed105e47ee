// ==========================================
// 任务导入服务 - 应用配置
// ==========================================
// 职责: YAML 加载 + 环境变量覆写 + 启动期校验
// 约束: 进程启动时加载一次，运行期不重载
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
/// 环境变量覆写前缀
pub const ENV_PREFIX: &str = "TASK_IMPORT_";

/// 令牌有效期上限（一年）
pub const MAX_JWT_EXPIRY_HOURS: i64 = 8760;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseFailed(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidOverride { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ==========================================
// AppConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub import: ImportConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 为空时使用用户数据目录下的 tasks.db
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// 慢 SQL 阈值（毫秒），0 表示关闭
    #[serde(default = "default_slow_sql_ms")]
    pub slow_sql_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    crate::db::DEFAULT_BUSY_TIMEOUT_MS
}

fn default_slow_sql_ms() -> u64 {
    200
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            slow_sql_ms: default_slow_sql_ms(),
        }
    }
}

impl DatabaseConfig {
    /// 解析后的数据库文件路径
    pub fn resolved_path(&self) -> String {
        match &self.path {
            Some(path) if !path.trim().is_empty() => path.clone(),
            _ => get_default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_import_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// 提取阶段存在行级错误时是否继续导入其余记录
    #[serde(default)]
    pub allow_partial: bool,
}

fn default_import_directory() -> PathBuf {
    PathBuf::from("data/import")
}

fn default_extensions() -> Vec<String> {
    vec!["csv".to_string(), "xlsx".to_string(), "xls".to_string()]
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            directory: default_import_directory(),
            extensions: default_extensions(),
            allow_partial: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret_key: String,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,
}

fn default_expiry_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    #[serde(alias = "text")]
    Fmt,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// 从 CONFIG_PATH（默认 config/config.yaml）加载配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    /// 加载配置文件 → 环境变量覆写 → 校验
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(path, "配置加载完成");
        Ok(config)
    }

    /// 仅解析 YAML（不覆写、不校验）
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// 环境变量覆写（lookup 便于测试注入）
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = get("SERVER_PORT") {
            self.server.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { key, value })?;
        }
        if let Some((_, value)) = get("DATABASE_PATH") {
            self.database.path = Some(value);
        }
        if let Some((_, value)) = get("IMPORT_DIRECTORY") {
            self.import.directory = PathBuf::from(value);
        }
        if let Some((_, value)) = get("JWT_SECRET_KEY") {
            self.jwt.secret_key = value;
        }
        if let Some((key, value)) = get("JWT_EXPIRY_HOURS") {
            self.jwt.expiry_hours = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { key, value })?;
        }

        debug!("环境变量覆写完成");
        Ok(())
    }

    /// 启动期校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".to_string()));
        }
        if self.jwt.secret_key.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt.secret_key must not be empty".to_string()));
        }
        if self.jwt.expiry_hours < 1 {
            return Err(ConfigError::Invalid(
                "jwt.expiry_hours must be at least 1".to_string(),
            ));
        }
        if self.jwt.expiry_hours > MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::Invalid(format!(
                "jwt.expiry_hours must be at most {MAX_JWT_EXPIRY_HOURS}"
            )));
        }
        if self.import.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "import.extensions must not be empty".to_string(),
            ));
        }
        if !self.import.directory.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "import.directory is not a directory: {}",
                self.import.directory.display()
            )));
        }
        Ok(())
    }

    /// 监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn import_dir(&self) -> &Path {
        &self.import.directory
    }
}

/// 获取默认数据库路径
///
/// 优先使用用户数据目录，拿不到时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./tasks.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("task-import-service");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("tasks.db");
        }
    }

    path.to_string_lossy().to_string()
}

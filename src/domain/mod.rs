// ==========================================
// 任务导入服务 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod client;
pub mod import;
pub mod task;
pub mod types;

// 重导出核心类型
pub use client::{ClientIdentity, ClientParamError};
pub use import::{ImportResult, ImportStage, ImportStatistics};
pub use task::{ImportRecord, PersistedTask, TaskStatusEntry};
pub use types::{TaskField, EXPECTED_HEADERS, REQUIRED_COLUMNS};

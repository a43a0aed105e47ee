// ==========================================
// 任务导入服务 - 应用层
// ==========================================
// 职责: 组件装配与共享状态
// ==========================================

pub mod state;

// 重导出
pub use state::{AppInitError, AppState};

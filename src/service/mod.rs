// ==========================================
// 任务导入服务 - 应用服务层
// ==========================================
// 职责: 读侧查询编排（参数校验 + DTO 映射）
// ==========================================

pub mod task_query_service;

pub use task_query_service::{
    StatusDetailDto, StatusHistoryResponse, TaskDetailDto, TaskQueryService, TasksResponse,
};

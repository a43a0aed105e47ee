// ==========================================
// 任务导入服务 - 任务查询服务
// ==========================================
// 职责: 客户端参数校验 → 仓储查询 → DTO 映射
// 约定: 参数非法返回 success=false 的响应（不是错误）；仓储失败返回 Err
// ==========================================

use crate::domain::client::ClientIdentity;
use crate::domain::task::{PersistedTask, TaskStatusEntry};
use crate::repository::{RepositoryResult, TaskQueryRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const MESSAGE_ACTIVE_TASKS_OK: &str = "Successfully retrieved active tasks";
pub const MESSAGE_HISTORY_OK: &str = "Successfully retrieved status history";

// ==========================================
// 响应 DTO
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetailDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub is_active: bool,
    pub client_name: String,
    pub client_id: String,
}

impl From<PersistedTask> for TaskDetailDto {
    fn from(task: PersistedTask) -> Self {
        Self {
            id: task.id,
            name: task.name,
            email: task.email,
            department: task.department,
            position: task.position,
            is_active: task.is_active,
            client_name: task.client_name.unwrap_or_default(),
            client_id: task.client_id.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksResponse {
    pub success: bool,
    pub message: String,
    pub tasks: Vec<TaskDetailDto>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDetailDto {
    pub task_id: i64,
    pub status: String,
    pub status_description: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<TaskStatusEntry> for StatusDetailDto {
    fn from(entry: TaskStatusEntry) -> Self {
        Self {
            task_id: entry.task_id,
            status: entry.status,
            status_description: entry.status_description,
            updated_by: entry.updated_by,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryResponse {
    pub success: bool,
    pub message: String,
    pub history: Vec<StatusDetailDto>,
    pub total_count: usize,
}

// ==========================================
// TaskQueryService
// ==========================================
pub struct TaskQueryService {
    repo: Arc<dyn TaskQueryRepository>,
}

impl TaskQueryService {
    pub fn new(repo: Arc<dyn TaskQueryRepository>) -> Self {
        Self { repo }
    }

    /// 查询客户端在用任务
    #[instrument(skip(self, identity), fields(client_name = %identity.client_name))]
    pub async fn get_active_tasks(
        &self,
        identity: &ClientIdentity,
    ) -> RepositoryResult<TasksResponse> {
        if let Err(e) = identity.validate() {
            warn!(error = %e, "查询参数校验失败");
            return Ok(TasksResponse {
                success: false,
                message: format!("Invalid parameters: {e}"),
                tasks: Vec::new(),
                total_count: 0,
            });
        }

        let tasks: Vec<TaskDetailDto> = self
            .repo
            .get_active_tasks(identity.client_name.trim(), identity.client_id.trim())
            .await?
            .into_iter()
            .map(TaskDetailDto::from)
            .collect();

        info!(task_count = tasks.len(), "查询在用任务完成");
        Ok(TasksResponse {
            success: true,
            message: MESSAGE_ACTIVE_TASKS_OK.to_string(),
            total_count: tasks.len(),
            tasks,
        })
    }

    /// 查询客户端任务状态历史（最新在前）
    #[instrument(skip(self, identity), fields(client_name = %identity.client_name))]
    pub async fn get_task_status_history(
        &self,
        identity: &ClientIdentity,
    ) -> RepositoryResult<StatusHistoryResponse> {
        if let Err(e) = identity.validate() {
            warn!(error = %e, "查询参数校验失败");
            return Ok(StatusHistoryResponse {
                success: false,
                message: format!("Invalid parameters: {e}"),
                history: Vec::new(),
                total_count: 0,
            });
        }

        let history: Vec<StatusDetailDto> = self
            .repo
            .get_task_status_history(identity.client_name.trim(), identity.client_id.trim())
            .await?
            .into_iter()
            .map(StatusDetailDto::from)
            .collect();

        debug!(entry_count = history.len(), "查询状态历史完成");
        Ok(StatusHistoryResponse {
            success: true,
            message: MESSAGE_HISTORY_OK.to_string(),
            total_count: history.len(),
            history,
        })
    }
}

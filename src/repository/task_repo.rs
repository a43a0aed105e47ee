// ==========================================
// 任务导入服务 - 任务 Repository Trait
// ==========================================
// 职责: 定义任务相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据读写
// ==========================================

use crate::domain::task::{ImportRecord, PersistedTask, TaskStatusEntry};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// TaskCommandRepository Trait
// ==========================================
// 用途: 导入写入
// 实现者: TaskRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait TaskCommandRepository: Send + Sync {
    /// 批量插入任务（单事务，全部成功或全部回滚）
    ///
    /// # 返回
    /// - Ok(usize): 插入的记录数
    /// - Err(RowInsertFailed): 第 row 条（1 起）插入失败，整批已回滚
    async fn bulk_insert_tasks(&self, records: &[ImportRecord]) -> RepositoryResult<usize>;
}

// 共享仓储（同一连接同时服务写入与查询）
#[async_trait]
impl<T> TaskCommandRepository for Arc<T>
where
    T: TaskCommandRepository + ?Sized,
{
    async fn bulk_insert_tasks(&self, records: &[ImportRecord]) -> RepositoryResult<usize> {
        (**self).bulk_insert_tasks(records).await
    }
}

// ==========================================
// TaskQueryRepository Trait
// ==========================================
// 用途: 读侧查询
#[async_trait]
pub trait TaskQueryRepository: Send + Sync {
    /// 查询客户端的在用任务（按 id 升序）
    async fn get_active_tasks(
        &self,
        client_name: &str,
        client_id: &str,
    ) -> RepositoryResult<Vec<PersistedTask>>;

    /// 查询客户端的任务状态历史（最新在前）
    async fn get_task_status_history(
        &self,
        client_name: &str,
        client_id: &str,
    ) -> RepositoryResult<Vec<TaskStatusEntry>>;
}

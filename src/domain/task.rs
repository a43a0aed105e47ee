// ==========================================
// 任务导入服务 - 任务领域模型
// ==========================================
// 职责: 导入记录 / 落库任务 / 任务状态历史
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportRecord - 单行导入记录
// ==========================================
// 用途: 提取器生成，校验器/仓储只读
// 约束: 字符串字段已 TRIM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub address: String,
    pub phone_number: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
}

// ==========================================
// PersistedTask - tasks 表记录
// ==========================================
// 用途: 批量插入成功后由存储生成，本服务只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTask {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub address: String,
    pub phone_number: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    pub client_name: Option<String>,
    pub client_id: Option<String>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// TaskStatusEntry - task_status 表记录
// ==========================================
// 用途: 状态历史查询（写入方为外部系统）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusEntry {
    pub task_id: i64,
    pub client_name: String,
    pub client_id: String,
    pub status: String,
    pub status_description: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
}

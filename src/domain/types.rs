// ==========================================
// 任务导入服务 - 领域类型定义
// ==========================================
// 职责: 导入字段枚举、表头常量
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 导入文件必须包含的列（顺序固定，比较时忽略大小写）
pub const EXPECTED_HEADERS: [&str; 9] = [
    "Name",
    "Email",
    "Age",
    "Address",
    "Phone Number",
    "Department",
    "Position",
    "Salary",
    "Hire Date",
];

/// 每个数据行至少需要的列数
pub const REQUIRED_COLUMNS: usize = EXPECTED_HEADERS.len();

// ==========================================
// TaskField - 导入字段
// ==========================================
// 用途: 错误信息中标识出错字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Name,
    Email,
    Age,
    Address,
    PhoneNumber,
    Department,
    Position,
    Salary,
    HireDate,
}

impl TaskField {
    /// 字段在数据行中的列下标
    pub fn column_index(self) -> usize {
        match self {
            TaskField::Name => 0,
            TaskField::Email => 1,
            TaskField::Age => 2,
            TaskField::Address => 3,
            TaskField::PhoneNumber => 4,
            TaskField::Department => 5,
            TaskField::Position => 6,
            TaskField::Salary => 7,
            TaskField::HireDate => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskField::Name => "name",
            TaskField::Email => "email",
            TaskField::Age => "age",
            TaskField::Address => "address",
            TaskField::PhoneNumber => "phone number",
            TaskField::Department => "department",
            TaskField::Position => "position",
            TaskField::Salary => "salary",
            TaskField::HireDate => "hire date",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

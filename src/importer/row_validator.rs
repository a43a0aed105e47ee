// ==========================================
// 任务导入服务 - 数据行校验器实现
// ==========================================
// 职责: 逐字段语义校验（必填 / 长度 / 格式 / 数值范围）
// 策略: 批量校验遇到第一条非法记录即停止（与提取阶段的收集策略不同）
// ==========================================

use crate::domain::task::ImportRecord;
use crate::domain::types::TaskField;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::task_importer_trait::RowValidator;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid email regex")
});

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 100;
const MAX_DEPARTMENT_LEN: usize = 50;
const MAX_POSITION_LEN: usize = 50;
const MAX_AGE: i32 = 150;
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// 单字段违规
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct FieldViolation {
    pub field: TaskField,
    pub message: String,
}

impl FieldViolation {
    fn new(field: TaskField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub struct TaskRowValidator;

impl TaskRowValidator {
    fn check_text(
        field: TaskField,
        value: &str,
        max_len: Option<usize>,
    ) -> Result<(), FieldViolation> {
        if value.trim().is_empty() {
            return Err(FieldViolation::new(field, format!("{field} cannot be empty")));
        }
        if let Some(max) = max_len {
            if value.chars().count() > max {
                return Err(FieldViolation::new(
                    field,
                    format!("{field} cannot be longer than {max} characters"),
                ));
            }
        }
        Ok(())
    }

    fn check_email(email: &str) -> Result<(), FieldViolation> {
        Self::check_text(TaskField::Email, email, Some(MAX_EMAIL_LEN))?;
        if !EMAIL_REGEX.is_match(email) {
            return Err(FieldViolation::new(TaskField::Email, "invalid email format"));
        }
        Ok(())
    }

    fn check_age(age: i32) -> Result<(), FieldViolation> {
        if age <= 0 {
            return Err(FieldViolation::new(TaskField::Age, "age must be greater than 0"));
        }
        if age > MAX_AGE {
            return Err(FieldViolation::new(
                TaskField::Age,
                format!("age cannot be greater than {MAX_AGE}"),
            ));
        }
        Ok(())
    }

    fn check_phone(phone: &str) -> Result<(), FieldViolation> {
        Self::check_text(TaskField::PhoneNumber, phone, None)?;

        // 去掉分隔符后必须是 7-15 位数字
        let digits: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+'))
            .collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || !PHONE_DIGITS.contains(&digits.len()) {
            return Err(FieldViolation::new(
                TaskField::PhoneNumber,
                "phone number must contain 7-15 digits",
            ));
        }
        Ok(())
    }

    fn check_salary(salary: f64) -> Result<(), FieldViolation> {
        if salary < 0.0 {
            return Err(FieldViolation::new(TaskField::Salary, "salary cannot be negative"));
        }
        Ok(())
    }
}

impl RowValidator for TaskRowValidator {
    fn validate_one(&self, record: &ImportRecord) -> Result<(), FieldViolation> {
        Self::check_text(TaskField::Name, &record.name, Some(MAX_NAME_LEN))?;
        Self::check_email(&record.email)?;
        Self::check_age(record.age)?;
        Self::check_text(TaskField::Address, &record.address, None)?;
        Self::check_phone(&record.phone_number)?;
        Self::check_text(TaskField::Department, &record.department, Some(MAX_DEPARTMENT_LEN))?;
        Self::check_text(TaskField::Position, &record.position, Some(MAX_POSITION_LEN))?;
        Self::check_salary(record.salary)
    }

    fn validate_batch(
        &self,
        records: &[ImportRecord],
        row_numbers: &[usize],
    ) -> ImporterResult<()> {
        for (idx, record) in records.iter().enumerate() {
            if let Err(violation) = self.validate_one(record) {
                let row = row_numbers.get(idx).copied().unwrap_or(idx + 1);
                warn!(row_number = row, field = %violation.field, "记录校验失败");
                return Err(ImportError::Validation {
                    row,
                    field: violation.field,
                    message: violation.message,
                });
            }
        }
        Ok(())
    }
}

// ==========================================
// 任务导入服务 - 客户端身份
// ==========================================
// 用途: 令牌签发 / 读侧查询的客户端参数
// 约束: client_name 非空；client_id 为 UUID
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// 客户端参数错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientParamError {
    #[error("client name cannot be empty")]
    EmptyName,

    #[error("client ID cannot be empty")]
    EmptyId,

    #[error("invalid client ID format: must be a valid UUID")]
    InvalidId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub client_name: String,
    pub client_id: String,
}

impl ClientIdentity {
    pub fn new(client_name: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            client_id: client_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ClientParamError> {
        if self.client_name.trim().is_empty() {
            return Err(ClientParamError::EmptyName);
        }
        if self.client_id.trim().is_empty() {
            return Err(ClientParamError::EmptyId);
        }
        Uuid::parse_str(self.client_id.trim()).map_err(|_| ClientParamError::InvalidId)?;
        Ok(())
    }
}

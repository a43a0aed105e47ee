// ==========================================
// 任务导入服务 - 认证错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("failed to generate token: {0}")]
    TokenGeneration(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        }
    }
}

// ==========================================
// 任务导入服务 - API层错误类型
// ==========================================
// 职责: 将下层错误映射为 HTTP 状态码 + JSON 错误体
// 响应体: {success:false, message, errors?}
// ==========================================

use crate::auth::AuthError;
use crate::repository::error::RepositoryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求体无法解析
    #[error("Invalid request format: {0}")]
    InvalidRequest(String),

    /// 请求参数不合法
    #[error("{0}")]
    InvalidInput(String),

    /// 认证失败
    #[error("{0}")]
    Unauthorized(&'static str),

    /// 仓储失败（context 为面向调用方的说明）
    #[error("{context}: {source}")]
    Repository {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },

    #[error("Failed to generate token: {0}")]
    TokenGeneration(#[from] AuthError),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn repository(context: &'static str, source: RepositoryError) -> Self {
        ApiError::Repository { context, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Repository { .. }
            | ApiError::TokenGeneration(_)
            | ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, errors) = match self {
            ApiError::InvalidRequest(detail) => {
                ("Invalid request format".to_string(), vec![detail.clone()])
            }
            ApiError::InvalidInput(msg) => (msg.clone(), Vec::new()),
            ApiError::Unauthorized(msg) => (msg.to_string(), Vec::new()),
            ApiError::Repository { context, source } => {
                (context.to_string(), vec![source.to_string()])
            }
            ApiError::TokenGeneration(e) => {
                ("Failed to generate token".to_string(), vec![e.to_string()])
            }
            ApiError::InternalError(msg) => ("Internal server error".to_string(), vec![msg.clone()]),
        };

        ErrorBody {
            success: false,
            message,
            errors,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "请求处理失败");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "请求被拒绝");
        }
        (status, Json(self.body())).into_response()
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

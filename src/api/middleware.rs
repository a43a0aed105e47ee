// ==========================================
// 任务导入服务 - 认证中间件
// ==========================================
// 职责: 校验 Bearer 令牌，将 ClientClaims 写入请求扩展
// 适用: 读侧查询路由
// ==========================================

use crate::api::error::ApiError;
use crate::app::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// 从 Authorization 头中取出令牌
///
/// 格式必须为 `Bearer <token>`（以单个空格分为两段）
pub(crate) fn extract_bearer_token(value: &str) -> Result<&str, ApiError> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(ApiError::Unauthorized("Invalid authorization format")),
    }
}

/// Bearer 认证中间件
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header_value = match req.headers().get(header::AUTHORIZATION) {
        Some(v) => v,
        None => return ApiError::Unauthorized("Authorization header is required").into_response(),
    };

    let token = match header_value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization format"))
        .and_then(extract_bearer_token)
    {
        Ok(t) => t.to_string(),
        Err(e) => return e.into_response(),
    };

    match state.jwt.validate_token(&token) {
        Ok(claims) => {
            tracing::debug!(client_name = %claims.client_name, "令牌校验通过");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "令牌校验失败");
            ApiError::Unauthorized("Invalid token").into_response()
        }
    }
}

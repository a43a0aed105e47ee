// ==========================================
// 任务导入服务 - 读侧查询 API
// ==========================================
// 职责: 在用任务 / 状态历史查询
// 认证: 由 require_bearer 中间件注入 ClientClaims
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::auth::ClientClaims;
use crate::domain::client::ClientIdentity;
use crate::service::{StatusHistoryResponse, TasksResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};

/// GET /api/queries/tasks/active
pub async fn get_active_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<ClientClaims>,
) -> ApiResult<Json<TasksResponse>> {
    let response = state
        .query_service
        .get_active_tasks(&claims.identity())
        .await
        .map_err(|e| ApiError::repository("Failed to retrieve active tasks", e))?;
    Ok(Json(response))
}

/// GET /api/queries/tasks/history
///
/// 请求体可选 `{client_name, client_id}`；为空时使用令牌中的客户端
pub async fn get_task_status_history(
    State(state): State<AppState>,
    Extension(claims): Extension<ClientClaims>,
    body: Bytes,
) -> ApiResult<Json<StatusHistoryResponse>> {
    let identity = if body.iter().all(u8::is_ascii_whitespace) {
        claims.identity()
    } else {
        serde_json::from_slice::<ClientIdentity>(&body)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    };

    let response = state
        .query_service
        .get_task_status_history(&identity)
        .await
        .map_err(|e| ApiError::repository("Failed to retrieve task status history", e))?;
    Ok(Json(response))
}

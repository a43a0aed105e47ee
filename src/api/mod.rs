// ==========================================
// 任务导入服务 - API 层
// ==========================================
// 职责: HTTP 路由与处理器（axum）
// 认证: 读侧查询路由需 Bearer 令牌
// ==========================================

pub mod auth_api;
pub mod error;
pub mod import_api;
pub mod middleware;
pub mod query_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorBody};

use crate::app::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// 构建应用路由
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/queries/tasks/active", get(query_api::get_active_tasks))
        .route(
            "/api/queries/tasks/history",
            get(query_api::get_task_status_history),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_bearer,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/commands/import", post(import_api::import_tasks))
        .route(
            "/api/v1/commands/import-tasks",
            post(import_api::import_tasks_v1),
        )
        .route("/api/auth/token", post(auth_api::issue_token))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ==========================================
// 任务导入服务 - 导入 API
// ==========================================
// 职责: 触发一次导入，返回结构化导入结果
// 状态码: 成功 200；任何失败终态 500（结果体同样返回）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// v1 导入请求体
#[derive(Debug, Default, Deserialize)]
pub struct ImportTasksRequest {
    #[serde(default)]
    pub directory_path: Option<String>,
}

/// POST /api/commands/import
pub async fn import_tasks(State(state): State<AppState>) -> Response {
    tracing::info!("收到导入请求");
    run_import(&state, None).await
}

/// POST /api/v1/commands/import-tasks
///
/// 请求体可为空；非空时须为 `{ "directory_path": "..." }`，
/// 且目录必须位于配置的导入目录之内
pub async fn import_tasks_v1(State(state): State<AppState>, body: Bytes) -> Response {
    let dir = match resolve_request_dir(state.config.import_dir(), &body) {
        Ok(dir) => dir,
        Err(e) => return e.into_response(),
    };
    tracing::info!(directory = ?dir, "收到导入请求(v1)");
    run_import(&state, dir.as_deref()).await
}

async fn run_import(state: &AppState, dir: Option<&Path>) -> Response {
    let outcome = match dir {
        Some(dir) => state.importer.import_from(dir).await,
        None => state.importer.import().await,
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(failure) => {
            tracing::error!(stage = %failure.stage, error = %failure.error, "导入失败");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failure.result)).into_response()
        }
    }
}

/// 解析请求体中的目录
///
/// # 返回
/// - Ok(None): 使用配置的导入目录
/// - Ok(Some(dir)): 规范化后的目标目录
pub(crate) fn resolve_request_dir(import_root: &Path, body: &[u8]) -> ApiResult<Option<PathBuf>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let request: ImportTasksRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let requested = match request.directory_path.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(p) => p,
    };

    let root = import_root.canonicalize().map_err(|e| {
        ApiError::InternalError(format!("import directory is not accessible: {e}"))
    })?;
    let target = Path::new(requested)
        .canonicalize()
        .map_err(|_| ApiError::InvalidInput(format!("Invalid directory path: {requested}")))?;

    if !target.starts_with(&root) {
        return Err(ApiError::InvalidInput(format!(
            "Directory is outside the import directory: {requested}"
        )));
    }
    if !target.is_dir() {
        return Err(ApiError::InvalidInput(format!(
            "Invalid directory path: {requested}"
        )));
    }

    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_body_uses_configured_dir() {
        let root = tempdir().unwrap();
        assert!(resolve_request_dir(root.path(), b"").unwrap().is_none());
        assert!(resolve_request_dir(root.path(), b"  \n").unwrap().is_none());
        assert!(resolve_request_dir(root.path(), b"{}").unwrap().is_none());
    }

    #[test]
    fn test_malformed_body_rejected() {
        let root = tempdir().unwrap();
        let err = resolve_request_dir(root.path(), b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_subdirectory_accepted() {
        let root = tempdir().unwrap();
        let sub = root.path().join("batch1");
        std::fs::create_dir(&sub).unwrap();
        let body = serde_json::json!({ "directory_path": sub.to_string_lossy() }).to_string();

        let resolved = resolve_request_dir(root.path(), body.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(resolved, sub.canonicalize().unwrap());
    }

    #[test]
    fn test_outside_directory_rejected() {
        let root = tempdir().unwrap();
        let other = tempdir().unwrap();
        let body = serde_json::json!({ "directory_path": other.path().to_string_lossy() })
            .to_string();

        let err = resolve_request_dir(root.path(), body.as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let traversal = root.path().join("..");
        let body = serde_json::json!({ "directory_path": traversal.to_string_lossy() })
            .to_string();
        let err = resolve_request_dir(root.path(), body.as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_directory_rejected() {
        let root = tempdir().unwrap();
        let missing = root.path().join("nope");
        let body = serde_json::json!({ "directory_path": missing.to_string_lossy() }).to_string();
        let err = resolve_request_dir(root.path(), body.as_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}

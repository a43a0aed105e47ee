// ==========================================
// 任务导入服务 - 令牌签发 API
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::domain::client::ClientIdentity;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

pub const MESSAGE_TOKEN_OK: &str = "Token generated successfully";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}

/// POST /api/auth/token
///
/// 请求体 `{client_name, client_id}`；client_id 必须为 UUID
pub async fn issue_token(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<TokenResponse>> {
    let identity: ClientIdentity =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    identity
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let identity = ClientIdentity::new(identity.client_name.trim(), identity.client_id.trim());
    let token = state.jwt.generate_token(&identity)?;

    tracing::info!(client_name = %identity.client_name, "令牌已签发");
    Ok(Json(TokenResponse {
        success: true,
        token,
        message: MESSAGE_TOKEN_OK.to_string(),
    }))
}

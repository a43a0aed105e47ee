// ==========================================
// 任务导入服务 - JWT 令牌
// ==========================================
// 算法: HS256
// 声明: client_name / client_id / iat / exp
// ==========================================

use crate::auth::error::AuthError;
use crate::config::JwtConfig;
use crate::domain::client::ClientIdentity;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 令牌声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientClaims {
    pub client_name: String,
    pub client_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl ClientClaims {
    pub fn identity(&self) -> ClientIdentity {
        ClientIdentity::new(self.client_name.clone(), self.client_id.clone())
    }
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    // 超出 chrono 可表示范围时为 None，签发时报错
    expiry: Option<Duration>,
}

impl JwtManager {
    pub fn new(secret_key: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            expiry: Duration::try_hours(expiry_hours),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret_key, config.expiry_hours)
    }

    /// 为客户端签发令牌
    pub fn generate_token(&self, identity: &ClientIdentity) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = self
            .expiry
            .and_then(|expiry| now.checked_add_signed(expiry))
            .ok_or_else(|| AuthError::TokenGeneration("token expiry out of range".to_string()))?;
        let claims = ClientClaims {
            client_name: identity.client_name.clone(),
            client_id: identity.client_id.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        debug!(client_name = %identity.client_name, "签发令牌");
        Ok(token)
    }

    /// 校验令牌签名与有效期
    pub fn validate_token(&self, token: &str) -> Result<ClientClaims, AuthError> {
        let data = decode::<ClientClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

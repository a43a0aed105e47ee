// ==========================================
// 任务导入服务 - 认证层
// ==========================================
// 职责: 客户端令牌签发与校验
// ==========================================

pub mod error;
pub mod jwt;

pub use error::AuthError;
pub use jwt::{ClientClaims, JwtManager};

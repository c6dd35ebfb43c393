// ==========================================
// 生产计数服务 - 账号与令牌 API
// ==========================================
// 职责: 注册 / 登录 / 令牌校验
// 说明:
// - 密码使用 bcrypt 散列, 在 spawn_blocking 线程上计算
// - 令牌为 HS256 JWT, claims = {email, iat, exp}
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::user::{NewUser, User};
use crate::repository::UserRepository;

// ==========================================
// 请求体
// ==========================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// ==========================================
// TokenService - JWT 签发与校验
// ==========================================

/// 令牌载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// 签名密钥包在 SecretString 中, Debug 输出不泄露
#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: SecretString, ttl_secs: i64) -> Self {
        Self { secret, ttl_secs }
    }

    pub fn issue(&self, email: &str) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| ApiError::InternalError(format!("令牌签发失败: {}", e)))
    }

    /// 校验签名与过期时间
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))
    }
}

// ==========================================
// AuthApi
// ==========================================

/// 登录结果（两种失败的响应体不同, 交给路由层区分）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    UnknownEmail,
    WrongPassword,
    Success { token: String },
}

pub struct AuthApi {
    user_repo: Arc<UserRepository>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthApi {
    pub fn new(user_repo: Arc<UserRepository>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            user_repo,
            tokens,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> ApiResult<i64> {
        let email = req.email.as_deref().map(str::trim).unwrap_or_default();
        let password = req.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ApiError::InternalError(format!("散列任务失败: {}", e)))?
            .map_err(|e| ApiError::InternalError(format!("密码散列失败: {}", e)))?;

        let user = NewUser {
            email: email.to_string(),
            password_hash,
            fname: req.fname,
            lname: req.lname,
        };
        let id = self.user_repo.insert(user).await.map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Email already registered".to_string()),
            other => other,
        })?;
        info!(user_id = id, "用户注册成功");
        Ok(id)
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.user_repo.list().await?)
    }

    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginOutcome> {
        let email = req.email.unwrap_or_default();
        let password = req.password.unwrap_or_default();

        let user = match self.user_repo.find_by_email(email.trim()).await? {
            Some(user) => user,
            None => return Ok(LoginOutcome::UnknownEmail),
        };

        let hash = user.password_hash.clone();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ApiError::InternalError(format!("散列任务失败: {}", e)))?
            .map_err(|e| ApiError::InternalError(format!("密码校验失败: {}", e)))?;

        if !matched {
            warn!(user_id = user.id, "登录密码错误");
            return Ok(LoginOutcome::WrongPassword);
        }

        let token = self.tokens.issue(&user.email)?;
        Ok(LoginOutcome::Success { token })
    }

    /// 校验 `Authorization: Bearer <token>`
    pub fn authenticate(&self, authorization: Option<&str>) -> ApiResult<Claims> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("jwt must be provided".to_string()))?;
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use tempfile::NamedTempFile;

    fn token_service(secret: &str) -> TokenService {
        TokenService::new(SecretString::new(secret.to_string().into()), 3600)
    }

    async fn setup_api() -> (AuthApi, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let pool = DbPool::open(temp.path().to_str().unwrap(), 2).unwrap();
        pool.ensure_schema().await.unwrap();
        let api = AuthApi::new(
            Arc::new(UserRepository::new(pool)),
            token_service("test-secret"),
            4,
        );
        (api, temp)
    }

    fn register_req(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            fname: Some("Ada".to_string()),
            lname: Some("Lovelace".to_string()),
        }
    }

    #[test]
    fn test_token_roundtrip_and_wrong_secret() {
        let tokens = token_service("secret-a");
        let token = tokens.issue("ada@example.com").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);

        let err = token_service("secret-b").verify(&token).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(SecretString::new("s".to_string().into()), -120);
        let token = tokens.issue("ada@example.com").unwrap();
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", token_service("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_register_login_authenticate() {
        let (api, _temp) = setup_api().await;
        api.register(register_req("ada@example.com", "pw1")).await.unwrap();

        let err = api.register(register_req("ada@example.com", "pw2")).await.unwrap_err();
        assert_eq!(err.status_code(), 409);

        let err = api.register(register_req("", "pw")).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let outcome = api
            .login(LoginRequest {
                email: Some("nobody@example.com".to_string()),
                password: Some("pw1".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::UnknownEmail);

        let outcome = api
            .login(LoginRequest {
                email: Some("ada@example.com".to_string()),
                password: Some("wrong".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::WrongPassword);

        let token = match api
            .login(LoginRequest {
                email: Some("ada@example.com".to_string()),
                password: Some("pw1".to_string()),
            })
            .await
            .unwrap()
        {
            LoginOutcome::Success { token } => token,
            other => panic!("Expected Success, got {:?}", other),
        };

        let header = format!("Bearer {}", token);
        let claims = api.authenticate(Some(&header)).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert!(api.authenticate(None).is_err());
        assert!(api.authenticate(Some("Bearer garbage")).is_err());

        let users = api.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
    }
}

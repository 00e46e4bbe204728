//! 认证服务：注册、登录

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{auth::*, user::*},
    repository::{UserRepository, USER_CONFLICT_MESSAGE},
};
use std::sync::Arc;
use validator::Validate;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            users,
            jwt_service,
            hasher: PasswordHasher::new(),
        }
    }

    /// 用户注册
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        req.validate()?;

        // 用户名或邮箱任一已存在即冲突，不透露是哪一个
        if self
            .users
            .exists_by_username_or_email(&req.username, &req.email)
            .await?
        {
            tracing::warn!(username = %req.username, "Registration rejected: duplicate identity");
            return Err(AppError::Conflict(USER_CONFLICT_MESSAGE.to_string()));
        }

        let password_hash = self.hash_password(req.password).await?;

        // 检查与插入之间的竞争由存储层的唯一约束兜底，同样返回 Conflict
        let user = self
            .users
            .create(&NewUser {
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        let token = self.jwt_service.issue(user.id)?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        Ok(RegisterResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserResponse::from(user),
        })
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        // 用户不存在与密码错误返回完全相同的错误
        let user = match self.users.find_by_username(&req.username).await? {
            Some(user) => user,
            None => {
                tracing::debug!(username = %req.username, "Login failed: unknown user");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.verify_password(req.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = user.id, "Login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt_service.issue(user.id)?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
        })
    }

    /// 当前登录用户
    pub async fn current_user(&self, user_id: i64) -> Result<MeResponse, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok(MeResponse {
            user_id,
            user: UserResponse::from(user),
        })
    }

    // Argon2 是 CPU 密集型操作，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal_error(format!("hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::internal_error(format!("verification task failed: {}", e)))
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::auth_dto::{
    AuthResponse, LoginPayload, ResetPasswordPayload, SignupPayload, UpdateProfilePayload,
};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::storage_service::StorageService;
use crate::utils::crypto::{hash_credential, verify_credential};
use crate::utils::ids::short_id;
use crate::utils::jwt::{sign_session_token, verify_session_token};

/// Identity of the caller, resolved by the auth middleware and handed to
/// every handler that needs it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: String,
    pub session_id: Uuid,
}

#[derive(Debug, Clone)]
struct LoginSession {
    user_id: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    storage: StorageService,
    jwt_secret: String,
    session_ttl_hours: i64,
    sessions: Arc<RwLock<HashMap<Uuid, LoginSession>>>,
}

impl AuthService {
    pub fn new(storage: StorageService, jwt_secret: String, session_ttl_hours: i64) -> Self {
        Self {
            storage,
            jwt_secret,
            session_ttl_hours,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn signup(&self, payload: SignupPayload) -> Result<AuthResponse> {
        let user = User {
            id: short_id(),
            email: payload.email.trim().to_string(),
            name: payload.name.trim().to_string(),
            avatar: None,
        };
        let password_hash = hash_credential(&payload.password)?;
        if !self.storage.register_user(user.clone(), password_hash).await? {
            return Err(Error::DuplicateAccount(user.email));
        }
        tracing::info!(user_id = %user.id, "account registered");
        self.open_session(user).await
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse> {
        let stored = self
            .storage
            .find_user_by_email(payload.email.trim())
            .await?
            .ok_or(Error::InvalidCredential)?;
        if !verify_credential(&payload.password, &stored.password_hash) {
            tracing::warn!(user_id = %stored.user.id, "login rejected");
            return Err(Error::InvalidCredential);
        }
        self.open_session(stored.user).await
    }

    async fn open_session(&self, user: User) -> Result<AuthResponse> {
        let session_id = Uuid::new_v4();
        let token =
            sign_session_token(&user.id, session_id, &self.jwt_secret, self.session_ttl_hours)?;
        self.sessions.write().await.insert(
            session_id,
            LoginSession {
                user_id: user.id.clone(),
                expires_at: Utc::now() + Duration::hours(self.session_ttl_hours),
            },
        );
        tracing::info!(user_id = %user.id, %session_id, "login session opened");
        Ok(AuthResponse { token, user })
    }

    /// Resolves a bearer token to its live session.
    pub async fn authenticate(&self, token: &str) -> Result<SessionContext> {
        let claims = verify_session_token(token, &self.jwt_secret)?;
        let sessions = self.sessions.read().await;
        match sessions.get(&claims.sid) {
            Some(s) if s.user_id == claims.sub && s.expires_at > Utc::now() => Ok(SessionContext {
                user_id: claims.sub,
                session_id: claims.sid,
            }),
            _ => Err(Error::Unauthorized("session_expired".to_string())),
        }
    }

    pub async fn logout(&self, ctx: &SessionContext) {
        self.sessions.write().await.remove(&ctx.session_id);
        tracing::info!(user_id = %ctx.user_id, session_id = %ctx.session_id, "login session closed");
    }

    pub async fn purge_expired_sessions(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    /// Replaces the caller's password. The email must be the caller's own;
    /// all of the account's login sessions are closed afterwards.
    pub async fn reset_password(
        &self,
        ctx: &SessionContext,
        payload: ResetPasswordPayload,
    ) -> Result<()> {
        let email = payload.email.trim();
        let stored = self
            .storage
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound("No account registered with this email".to_string()))?;
        if stored.user.id != ctx.user_id {
            return Err(Error::Forbidden(
                "passwords can only be reset for your own account".to_string(),
            ));
        }

        let password_hash = hash_credential(&payload.new_password)?;
        if !self.storage.set_password_hash(email, password_hash).await? {
            return Err(Error::NotFound("No account registered with this email".to_string()));
        }
        let closed = self.close_user_sessions(&ctx.user_id).await;
        tracing::info!(user_id = %ctx.user_id, closed, "password reset");
        Ok(())
    }

    async fn close_user_sessions(&self, user_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        before - sessions.len()
    }

    pub async fn profile(&self, ctx: &SessionContext) -> Result<User> {
        self.storage
            .find_user_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        ctx: &SessionContext,
        payload: UpdateProfilePayload,
    ) -> Result<User> {
        let mut user = self.profile(ctx).await?;
        if let Some(name) = payload.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = payload.email {
            user.email = email.trim().to_string();
        }
        if let Some(avatar) = payload.avatar {
            user.avatar = Some(avatar).filter(|a| !a.is_empty());
        }
        if !self.storage.update_profile(user.clone()).await? {
            return Err(Error::DuplicateAccount(user.email));
        }
        Ok(user)
    }
}

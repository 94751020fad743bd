//! Store-backed implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::{AccessTokenCodec, PasswordHasher, RefreshTokenManager, TokenStore, UserStore};
use crate::config::{AuthConfig, RevocationScope, SecurityConfig};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};

pub struct AuthGate {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    access_tokens: AccessTokenCodec,
    refresh_tokens: RefreshTokenManager,
    service_api_key: String,
    revocation_scope: RevocationScope,
}

impl AuthGate {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        auth: &AuthConfig,
        security: &SecurityConfig,
    ) -> Result<Self, AuthError> {
        let access_ttl = Duration::seconds(i64::try_from(auth.access_token_ttl_seconds).map_err(
            |_| AuthError::Validation("access_token_ttl_seconds is too large".to_string()),
        )?);
        let refresh_ttl = Duration::days(i64::from(auth.refresh_token_ttl_days));

        Ok(Self {
            users,
            hasher: PasswordHasher::new(security)?,
            access_tokens: AccessTokenCodec::hs256(&auth.jwt_secret, access_ttl)?,
            refresh_tokens: RefreshTokenManager::new(tokens, refresh_ttl),
            service_api_key: auth.service_api_key.clone(),
            revocation_scope: auth.revocation_scope,
        })
    }

    #[must_use]
    pub const fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub const fn refresh_tokens(&self) -> &RefreshTokenManager {
        &self.refresh_tokens
    }
}

#[async_trait]
impl AuthService for AuthGate {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let credentials = self
            .users
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Err(e) = self
            .hasher
            .verify_async(&credentials.password_hash, password)
            .await
        {
            tracing::warn!(user_id = %credentials.user.id, "Login rejected: {e}");
            return Err(e);
        }

        let user = credentials.user;

        // Sign first: persisting the refresh row is the only side effect.
        let access_token = self.access_tokens.issue(user.id)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            user,
            access_token,
            refresh_token: refresh_token.token,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = self.refresh_tokens.resolve_owner(refresh_token).await?;
        self.access_tokens.issue(user_id)
    }

    async fn revoke_session(&self, refresh_token: &str) -> Result<(), AuthError> {
        let user_id = self.refresh_tokens.resolve_owner(refresh_token).await?;

        match self.revocation_scope {
            RevocationScope::Token => {
                self.refresh_tokens.revoke_token(refresh_token).await?;
            }
            RevocationScope::User => {
                self.refresh_tokens.revoke(user_id).await?;
            }
        }

        tracing::info!(%user_id, scope = ?self.revocation_scope, "Session revoked");
        Ok(())
    }

    fn authenticate(&self, access_token: &str) -> Result<Uuid, AuthError> {
        self.access_tokens.verify(access_token)
    }

    fn authorize_service(&self, api_key: &str) -> Result<(), AuthError> {
        if self.service_api_key.is_empty() {
            tracing::warn!("Service API key is not configured; rejecting caller");
            return Err(AuthError::InvalidApiKey);
        }

        if bool::from(api_key.as_bytes().ct_eq(self.service_api_key.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}

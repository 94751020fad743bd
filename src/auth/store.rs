//! Persistence capabilities consumed by the authentication core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::AuthError;
use crate::models::{User, UserCredentials};

/// A persisted refresh token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Storage for refresh token rows.
///
/// Implementations must make each revoke call a single atomic statement.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, AuthError>;

    /// Returns the owner only for a token that is neither revoked nor expired
    /// at `now`. Filtering happens inside the lookup itself.
    async fn get_owner_by_valid_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AuthError>;

    /// Unfiltered lookup, used to explain why a token was rejected.
    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError>;

    /// Revokes every outstanding token of a user. Returns the affected rows.
    async fn revoke_tokens_for_user(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AuthError>;

    /// Revokes a single token. Returns the affected rows.
    async fn revoke_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AuthError>;
}

/// Read access to user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AuthError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;
}

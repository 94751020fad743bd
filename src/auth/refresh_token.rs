//! Opaque, store-backed refresh tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use super::AuthError;
use super::store::{RefreshToken, TokenStore};

const TOKEN_BYTES: usize = 32;

pub struct RefreshTokenManager {
    store: Arc<dyn TokenStore>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn TokenStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Creates and persists a fresh token for `user_id`.
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshToken, AuthError> {
        let now = Utc::now();

        let record = RefreshToken {
            token: generate_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        self.store.create_refresh_token(record).await
    }

    pub async fn resolve_owner(&self, token: &str) -> Result<Uuid, AuthError> {
        self.resolve_owner_at(token, Utc::now()).await
    }

    /// Returns the owner of a usable token.
    ///
    /// Valid tokens cost one filtered lookup. Rejected ones are looked up a
    /// second time, unfiltered, to tell revoked, expired and unknown apart.
    pub async fn resolve_owner_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        if let Some(user_id) = self.store.get_owner_by_valid_token(token, now).await? {
            return Ok(user_id);
        }

        match self.store.find_refresh_token(token).await? {
            None => Err(AuthError::InvalidToken),
            Some(record) if record.is_revoked() => Err(AuthError::RevokedToken),
            Some(record) if record.is_expired_at(now) => Err(AuthError::ExpiredToken),
            // Became valid between the two lookups; treat as unknown.
            Some(_) => Err(AuthError::InvalidToken),
        }
    }

    /// Revokes every outstanding token of `user_id`.
    pub async fn revoke(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let now = Utc::now();
        let revoked = self.store.revoke_tokens_for_user(user_id, now, now).await?;
        tracing::info!(%user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }

    /// Revokes only the given token.
    pub async fn revoke_token(&self, token: &str) -> Result<u64, AuthError> {
        let now = Utc::now();
        let revoked = self.store.revoke_token(token, now, now).await?;
        tracing::info!(revoked, "Revoked refresh token");
        Ok(revoked)
    }
}

/// Generate a random refresh token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();

    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_BYTES * 2), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

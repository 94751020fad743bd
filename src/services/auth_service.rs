//! Domain service for authentication and session management.
//!
//! Handles login, access-token refresh, session revocation, request
//! authentication and service (webhook) authorization.

use uuid::Uuid;

pub use crate::auth::{AuthError, ErrorKind};
use crate::models::User;

/// Login result containing the user and both issued tokens.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues an access token plus a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for an unknown email and
    /// [`AuthError::InvalidCredentials`] for a wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Mints a new access token for the owner of a valid refresh token.
    /// The refresh token itself is not rotated.
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Revokes the session behind a valid refresh token.
    async fn revoke_session(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Returns the user id an access token was issued for.
    fn authenticate(&self, access_token: &str) -> Result<Uuid, AuthError>;

    /// Checks the service API key presented by a trusted caller.
    fn authorize_service(&self, api_key: &str) -> Result<(), AuthError>;
}

use thiserror::Error;

/// Errors raised by the authentication core.
///
/// Use [`AuthError::kind`] to collapse a variant into the response taxonomy.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Token revoked")]
    RevokedToken,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error taxonomy shared with the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    NotFound,
    Internal,
}

impl AuthError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials
            | Self::MissingToken
            | Self::MissingApiKey
            | Self::InvalidToken
            | Self::ExpiredToken
            | Self::RevokedToken
            | Self::InvalidApiKey => ErrorKind::Unauthorized,
            Self::UserNotFound => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Hashing(_) | Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

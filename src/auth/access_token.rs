//! Stateless, signed access tokens.
//!
//! An access token is an HS256 JWT whose claims carry the user id as subject
//! together with issue and expiry times. Validation needs nothing but the
//! signing secret, so it never touches the database.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String, // Issuer
    pub sub: String, // Subject (user ID)
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration
}

/// Signs claims and checks signatures.
///
/// Implementations only deal with integrity; time based checks belong to
/// [`AccessTokenCodec`].
pub trait Signer: Send + Sync {
    fn sign(&self, claims: &AccessClaims) -> Result<String, AuthError>;

    /// Returns the claims only if the signature is valid.
    fn verify(&self, token: &str) -> Result<AccessClaims, AuthError>;
}

/// HMAC-SHA256 signer backed by a shared secret.
pub struct Hs256Signer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl Hs256Signer {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Internal(
                "Access token signing secret is empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced by the codec against its own clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            validation,
        })
    }
}

impl Signer for Hs256Signer {
    fn sign(&self, claims: &AccessClaims) -> Result<String, AuthError> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {e}")))
    }

    fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Access token rejected: {e}");
                AuthError::InvalidToken
            })
    }
}

/// Issues and verifies access tokens with a fixed lifetime.
#[derive(Clone)]
pub struct AccessTokenCodec {
    signer: Arc<dyn Signer>,
    ttl: Duration,
}

impl AccessTokenCodec {
    pub fn new(signer: Arc<dyn Signer>, ttl: Duration) -> Self {
        Self { signer, ttl }
    }

    /// Convenience constructor for the HS256 signer.
    pub fn hs256(secret: &str, ttl: Duration) -> Result<Self, AuthError> {
        Ok(Self::new(Arc::new(Hs256Signer::new(secret)?), ttl))
    }

    pub fn issue(&self, subject: Uuid) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = now + self.ttl;

        let claims = AccessClaims {
            iss: ACCESS_TOKEN_ISSUER.to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        self.signer.sign(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies the signature first, then expiry (`now <= exp`), then parses
    /// the subject.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        let claims = self.signer.verify(token)?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;
        if now > expires_at {
            return Err(AuthError::ExpiredToken);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}

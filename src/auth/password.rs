//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use tokio::task;

use super::AuthError;
use crate::config::SecurityConfig;

/// Hashes and verifies passwords with a fixed Argon2id work factor.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: &SecurityConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| AuthError::Hashing(format!("Invalid Argon2 params: {e}")))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produces a salted PHC-format hash of `plaintext`.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    /// Checks `plaintext` against a stored hash.
    ///
    /// A malformed stored hash is reported as a mismatch. The parameters
    /// embedded in the stored hash are used, so hashes produced under an
    /// older work factor still verify.
    pub fn verify(&self, stored_hash: &str, plaintext: &str) -> Result<(), AuthError> {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return Err(AuthError::InvalidCredentials);
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Runs [`Self::hash`] on the blocking pool.
    pub async fn hash_async(&self, plaintext: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();

        task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
    }

    /// Runs [`Self::verify`] on the blocking pool.
    pub async fn verify_async(&self, stored_hash: &str, plaintext: &str) -> Result<(), AuthError> {
        let hasher = self.clone();
        let stored_hash = stored_hash.to_string();
        let plaintext = plaintext.to_string();

        task::spawn_blocking(move || hasher.verify(&stored_hash, &plaintext))
            .await
            .map_err(|e| {
                AuthError::Internal(format!("Password verification task panicked: {e}"))
            })?
    }
}

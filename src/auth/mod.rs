//! Authentication core: password hashing, credential extraction, access
//! tokens and refresh tokens.
//!
//! Access tokens are self-verifying (see [`Signer`]); refresh tokens are
//! opaque handles that live in a [`TokenStore`]. The orchestration on top of
//! these pieces is [`crate::services::AuthGate`].

pub mod access_token;
pub mod credentials;
mod error;
pub mod password;
pub mod refresh_token;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use access_token::{AccessClaims, AccessTokenCodec, Hs256Signer, Signer};
pub use credentials::{extract_api_key, extract_bearer};
pub use error::{AuthError, ErrorKind};
pub use password::PasswordHasher;
pub use refresh_token::RefreshTokenManager;
pub use store::{RefreshToken, TokenStore, UserStore};

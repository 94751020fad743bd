pub use super::chirps::Entity as Chirps;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::users::Entity as Users;

pub mod chirp;
pub mod user;

pub use chirp::Chirp;
pub use user::{User, UserCredentials};

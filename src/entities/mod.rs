pub mod prelude;

pub mod chirps;
pub mod refresh_tokens;
pub mod users;

pub mod auth_service;
pub use auth_service::{AuthService, LoginResult};

pub mod auth_service_impl;
pub use auth_service_impl::AuthGate;

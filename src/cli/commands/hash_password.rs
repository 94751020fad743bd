//! Hash password command handler

use crate::auth::PasswordHasher;
use crate::config::Config;

pub fn cmd_hash_password(config: &Config, password: &str) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let hasher = PasswordHasher::new(&config.security)?;
    let hash = hasher.hash(password)?;

    println!("{hash}");
    Ok(())
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthError, RefreshToken, TokenStore, UserStore};
use crate::models::{Chirp, User, UserCredentials};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn refresh_token_repo(&self) -> repositories::refresh_token::RefreshTokenRepository {
        repositories::refresh_token::RefreshTokenRepository::new(self.conn.clone())
    }

    fn chirp_repo(&self) -> repositories::chirp::ChirpRepository {
        repositories::chirp::ChirpRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        self.user_repo().create(email, password_hash).await
    }

    pub async fn get_user_with_password(&self, email: &str) -> Result<Option<UserCredentials>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn update_user_email_and_password(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        self.user_repo()
            .update_email_and_password(id, email, password_hash)
            .await
    }

    pub async fn set_user_chirpy_red(&self, id: Uuid, is_chirpy_red: bool) -> Result<bool> {
        self.user_repo().set_chirpy_red(id, is_chirpy_red).await
    }

    pub async fn delete_all_users(&self) -> Result<u64> {
        self.user_repo().delete_all().await
    }

    // ========================================================================
    // Chirps
    // ========================================================================

    pub async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp> {
        self.chirp_repo().create(user_id, body).await
    }

    pub async fn list_chirps(&self, author_id: Option<Uuid>, descending: bool) -> Result<Vec<Chirp>> {
        self.chirp_repo().list(author_id, descending).await
    }

    pub async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>> {
        self.chirp_repo().get(id).await
    }

    pub async fn delete_chirp(&self, id: Uuid) -> Result<bool> {
        self.chirp_repo().delete(id).await
    }

    // ========================================================================
    // Refresh tokens
    // ========================================================================

    pub async fn create_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken> {
        self.refresh_token_repo().create(token).await
    }

    pub async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        self.refresh_token_repo().get(token).await
    }

    pub async fn get_owner_by_valid_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        self.refresh_token_repo().owner_if_valid(token, now).await
    }

    pub async fn revoke_refresh_tokens_for_user(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        self.refresh_token_repo()
            .revoke_for_user(user_id, revoked_at, updated_at)
            .await
    }

    pub async fn revoke_refresh_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        self.refresh_token_repo()
            .revoke(token, revoked_at, updated_at)
            .await
    }
}

/// True when the error chain carries a unique constraint violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl TokenStore for Store {
    async fn create_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, AuthError> {
        Ok(Self::create_refresh_token(self, token).await?)
    }

    async fn get_owner_by_valid_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AuthError> {
        Ok(Self::get_owner_by_valid_token(self, token, now).await?)
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        Ok(self.get_refresh_token(token).await?)
    }

    async fn revoke_tokens_for_user(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        Ok(self
            .revoke_refresh_tokens_for_user(user_id, revoked_at, updated_at)
            .await?)
    }

    async fn revoke_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        Ok(self
            .revoke_refresh_token(token, revoked_at, updated_at)
            .await?)
    }
}

#[async_trait]
impl UserStore for Store {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AuthError> {
        Ok(self.get_user_with_password(email).await?)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.get_user(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap()
    }

    fn token_for(user_id: Uuid, value: &str, expires_in: Duration) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            token: value.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + expires_in,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_user_roundtrip() {
        let store = memory_store().await;
        store.ping().await.unwrap();

        let user = store.create_user("saul@bettercall.com", "$argon2id$stub").await.unwrap();
        assert!(!user.is_chirpy_red);

        let creds = store
            .get_user_with_password("saul@bettercall.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, "$argon2id$stub");

        assert!(
            store
                .get_user_with_password("kim@wexler.com")
                .await
                .unwrap()
                .is_none()
        );

        assert!(store.set_user_chirpy_red(user.id, true).await.unwrap());
        assert!(store.get_user(user.id).await.unwrap().unwrap().is_chirpy_red);
        assert!(!store.set_user_chirpy_red(Uuid::new_v4(), true).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_fails() {
        let store = memory_store().await;
        store.create_user("dup@example.com", "h").await.unwrap();
        let err = store.create_user("dup@example.com", "h").await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_owner_lookup_filters_revoked_and_expired() {
        let store = memory_store().await;
        let user = store.create_user("jesse@example.com", "h").await.unwrap();
        let now = Utc::now();

        store
            .create_refresh_token(token_for(user.id, "live", Duration::days(60)))
            .await
            .unwrap();
        store
            .create_refresh_token(token_for(user.id, "stale", Duration::seconds(-5)))
            .await
            .unwrap();

        assert_eq!(
            Store::get_owner_by_valid_token(&store, "live", now).await.unwrap(),
            Some(user.id)
        );
        assert_eq!(
            Store::get_owner_by_valid_token(&store, "stale", now).await.unwrap(),
            None
        );
        assert_eq!(
            Store::get_owner_by_valid_token(&store, "missing", now).await.unwrap(),
            None
        );

        assert_eq!(store.revoke_refresh_token("live", now, now).await.unwrap(), 1);
        assert_eq!(
            Store::get_owner_by_valid_token(&store, "live", now).await.unwrap(),
            None
        );

        let row = store.get_refresh_token("live").await.unwrap().unwrap();
        assert!(row.revoked_at.is_some());
        // Already revoked rows are left untouched.
        assert_eq!(store.revoke_refresh_token("live", now, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_revoke_for_user_only_touches_that_user() {
        let store = memory_store().await;
        let a = store.create_user("a@example.com", "h").await.unwrap();
        let b = store.create_user("b@example.com", "h").await.unwrap();
        let now = Utc::now();

        for (user, value) in [(&a, "a1"), (&a, "a2"), (&b, "b1")] {
            store
                .create_refresh_token(token_for(user.id, value, Duration::days(1)))
                .await
                .unwrap();
        }

        assert_eq!(
            store.revoke_refresh_tokens_for_user(a.id, now, now).await.unwrap(),
            2
        );
        assert!(store.get_refresh_token("a1").await.unwrap().unwrap().is_revoked());
        assert!(store.get_refresh_token("a2").await.unwrap().unwrap().is_revoked());
        assert!(!store.get_refresh_token("b1").await.unwrap().unwrap().is_revoked());
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let store = memory_store().await;
        let user = store.create_user("gone@example.com", "h").await.unwrap();
        store
            .create_refresh_token(token_for(user.id, "orphan", Duration::days(1)))
            .await
            .unwrap();
        let chirp = store.create_chirp(user.id, "still here?").await.unwrap();

        assert_eq!(store.delete_all_users().await.unwrap(), 1);
        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(store.get_refresh_token("orphan").await.unwrap().is_none());
        assert!(store.get_chirp(chirp.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_chirp_listing_filters_and_orders() {
        let store = memory_store().await;
        let walt = store.create_user("walt@example.com", "h").await.unwrap();
        let jesse = store.create_user("jesse@example.com", "h").await.unwrap();

        let first = store.create_chirp(walt.id, "one").await.unwrap();
        let second = store.create_chirp(jesse.id, "two").await.unwrap();
        let third = store.create_chirp(walt.id, "three").await.unwrap();

        let ids = |chirps: Vec<Chirp>| chirps.into_iter().map(|c| c.id).collect::<Vec<_>>();

        assert_eq!(
            ids(store.list_chirps(None, false).await.unwrap()),
            vec![first.id, second.id, third.id]
        );
        assert_eq!(
            ids(store.list_chirps(None, true).await.unwrap()),
            vec![third.id, second.id, first.id]
        );
        assert_eq!(
            ids(store.list_chirps(Some(walt.id), false).await.unwrap()),
            vec![first.id, third.id]
        );
        assert!(store.list_chirps(Some(Uuid::new_v4()), false).await.unwrap().is_empty());

        assert!(store.delete_chirp(second.id).await.unwrap());
        assert!(!store.delete_chirp(second.id).await.unwrap());
        assert!(store.get_chirp(second.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_chirp_requires_existing_author() {
        let store = memory_store().await;
        assert!(store.create_chirp(Uuid::new_v4(), "orphan").await.is_err());
    }
}

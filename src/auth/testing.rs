//! In-memory stores for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::AuthError;
use super::store::{RefreshToken, TokenStore, UserStore};
use crate::models::{User, UserCredentials};

#[derive(Default)]
pub struct InMemoryTokenStore {
    rows: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryTokenStore {
    pub fn get(&self, token: &str) -> Option<RefreshToken> {
        self.rows.lock().unwrap().get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn create_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, AuthError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&token.token) {
            return Err(AuthError::Database("UNIQUE constraint failed".to_string()));
        }
        rows.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn get_owner_by_valid_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AuthError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(token)
            .filter(|r| r.revoked_at.is_none() && r.expires_at >= now)
            .map(|r| r.user_id))
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        Ok(self.get(token))
    }

    async fn revoke_tokens_for_user(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        let mut count = 0;
        for row in self.rows.lock().unwrap().values_mut() {
            if row.user_id == user_id && row.revoked_at.is_none() {
                row.revoked_at = Some(revoked_at);
                row.updated_at = updated_at;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn revoke_token(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(token) {
            Some(row) if row.revoked_at.is_none() => {
                row.revoked_at = Some(revoked_at);
                row.updated_at = updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<UserCredentials>>,
}

impl InMemoryUserStore {
    pub fn insert(&self, email: &str, password_hash: String) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(UserCredentials {
            user: user.clone(),
            password_hash,
        });
        user
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone()))
    }
}

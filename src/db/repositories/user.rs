use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::users;
use crate::models::{User, UserCredentials};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            is_chirpy_red: model.is_chirpy_red,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user with an already hashed password
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let now = chrono::Utc::now();

        let active = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            hashed_password: Set(password_hash.to_string()),
            is_chirpy_red: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Get user by email with password hash (for login)
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<UserCredentials>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.hashed_password.clone();
            UserCredentials {
                user: User::from(u),
                password_hash,
            }
        }))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Replace email and password hash. Returns `None` if the user does not exist.
    pub async fn update_email_and_password(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.email = Set(email.to_string());
        active.hashed_password = Set(password_hash.to_string());
        active.updated_at = Set(chrono::Utc::now());
        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(User::from(model)))
    }

    /// Set the Chirpy Red flag. Returns `false` if the user does not exist.
    pub async fn set_chirpy_red(&self, id: Uuid, is_chirpy_red: bool) -> Result<bool> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for upgrade")?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_chirpy_red = Set(is_chirpy_red);
        active.updated_at = Set(chrono::Utc::now());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Delete every user. Refresh tokens go with them (cascade).
    pub async fn delete_all(&self) -> Result<u64> {
        let res = users::Entity::delete_many()
            .exec(&self.conn)
            .await
            .context("Failed to delete users")?;

        Ok(res.rows_affected)
    }
}

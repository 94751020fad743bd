use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{chirps, prelude::*};
use crate::models::Chirp;

impl From<chirps::Model> for Chirp {
    fn from(model: chirps::Model) -> Self {
        Self {
            id: model.id,
            body: model.body,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct ChirpRepository {
    conn: DatabaseConnection,
}

impl ChirpRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp> {
        let now = chrono::Utc::now();

        let active = chirps::ActiveModel {
            id: Set(Uuid::new_v4()),
            body: Set(body.to_string()),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert chirp")?;

        Ok(Chirp::from(model))
    }

    /// All chirps, optionally for one author, ordered by creation time
    pub async fn list(&self, author_id: Option<Uuid>, descending: bool) -> Result<Vec<Chirp>> {
        let mut query = Chirps::find();
        if let Some(author_id) = author_id {
            query = query.filter(chirps::Column::UserId.eq(author_id));
        }

        query = if descending {
            query
                .order_by_desc(chirps::Column::CreatedAt)
                .order_by_desc(chirps::Column::Id)
        } else {
            query
                .order_by_asc(chirps::Column::CreatedAt)
                .order_by_asc(chirps::Column::Id)
        };

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to list chirps")?;

        Ok(rows.into_iter().map(Chirp::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Chirp>> {
        let row = Chirps::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query chirp")?;

        Ok(row.map(Chirp::from))
    }

    /// Returns `false` if no such chirp existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = Chirps::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete chirp")?;

        Ok(res.rows_affected > 0)
    }
}

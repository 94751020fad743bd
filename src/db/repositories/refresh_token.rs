use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::auth::RefreshToken;
use crate::entities::{prelude::*, refresh_tokens};

/// Repository for refresh token rows
pub struct RefreshTokenRepository {
    conn: DatabaseConnection,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(r: refresh_tokens::Model) -> RefreshToken {
        RefreshToken {
            token: r.token,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
            expires_at: r.expires_at,
            revoked_at: r.revoked_at,
        }
    }

    pub async fn create(&self, token: RefreshToken) -> Result<RefreshToken> {
        let active = refresh_tokens::ActiveModel {
            token: Set(token.token),
            user_id: Set(token.user_id),
            created_at: Set(token.created_at),
            updated_at: Set(token.updated_at),
            expires_at: Set(token.expires_at),
            revoked_at: Set(token.revoked_at),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert refresh token")?;

        Ok(Self::map_model(model))
    }

    pub async fn get(&self, token: &str) -> Result<Option<RefreshToken>> {
        let row = RefreshTokens::find_by_id(token.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query refresh token")?;

        Ok(row.map(Self::map_model))
    }

    /// Owner of a token that is neither revoked nor expired at `now`
    pub async fn owner_if_valid(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        let row = RefreshTokens::find_by_id(token.to_string())
            .filter(refresh_tokens::Column::RevokedAt.is_null())
            .filter(refresh_tokens::Column::ExpiresAt.gte(now))
            .one(&self.conn)
            .await
            .context("Failed to query owner of refresh token")?;

        Ok(row.map(|r| r.user_id))
    }

    pub async fn revoke_for_user(
        &self,
        user_id: Uuid,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let res = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::RevokedAt, Expr::value(revoked_at))
            .col_expr(refresh_tokens::Column::UpdatedAt, Expr::value(updated_at))
            .filter(refresh_tokens::Column::UserId.eq(user_id))
            .filter(refresh_tokens::Column::RevokedAt.is_null())
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh tokens for user")?;

        Ok(res.rows_affected)
    }

    pub async fn revoke(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let res = RefreshTokens::update_many()
            .col_expr(refresh_tokens::Column::RevokedAt, Expr::value(revoked_at))
            .col_expr(refresh_tokens::Column::UpdatedAt, Expr::value(updated_at))
            .filter(refresh_tokens::Column::Token.eq(token))
            .filter(refresh_tokens::Column::RevokedAt.is_null())
            .exec(&self.conn)
            .await
            .context("Failed to revoke refresh token")?;

        Ok(res.rows_affected)
    }
}

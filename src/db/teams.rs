//! `TeamStore` over SQLite.

use async_trait::async_trait;

use super::SqliteStore;
use crate::error::{is_unique_violation, AppError};
use super::users::{upsert_member_on, users_by_team_on};
use crate::models::{NewMember, Team};
use crate::store::TeamStore;

#[async_trait]
impl TeamStore for SqliteStore {
    async fn create_team(&self, name: &str) -> Result<Team, AppError> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name) VALUES (?) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::team_exists(name)
            } else {
                AppError::database_with_op(e.to_string(), "create_team")
            }
        })
    }

    async fn create_team_with_members(
        &self,
        name: &str,
        members: &[NewMember],
    ) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut team = sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name) VALUES (?) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::team_exists(name)
            } else {
                AppError::database_with_op(e.to_string(), "create_team_with_members")
            }
        })?;

        for member in members {
            upsert_member_on(&mut tx, team.id, member)
                .await
                .map_err(|e| AppError::database_with_op(e.to_string(), "upsert_member"))?;
        }

        team.members = users_by_team_on(&mut tx, team.id).await?;
        tx.commit().await?;

        Ok(team)
    }

    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>, AppError> {
        let team = sqlx::query_as::<_, Team>("SELECT id, name, created_at FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(team)
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, AppError> {
        let team =
            sqlx::query_as::<_, Team>("SELECT id, name, created_at FROM teams WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(team)
    }

    async fn team_exists(&self, name: &str) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM teams WHERE name = ?)")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }
}

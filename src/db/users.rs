//! `UserStore` over SQLite.

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::SqliteStore;
use crate::error::AppError;
use crate::models::{NewMember, User};
use crate::store::UserStore;

const USER_COLUMNS: &str = "id, user_id, username, is_active, team_id, created_at";

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user_by_external_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_users_by_team(&self, team_id: i64) -> Result<Vec<User>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users_by_team_on(&mut conn, team_id).await?)
    }

    async fn upsert_member(&self, team_id: i64, member: &NewMember) -> Result<User, AppError> {
        let mut conn = self.pool.acquire().await?;
        upsert_member_on(&mut conn, team_id, member)
            .await
            .map_err(|e| AppError::database_with_op(e.to_string(), "upsert_member"))
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = ? WHERE user_id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn deactivate_all_in_team(&self, team_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE team_id = ? AND is_active = 1")
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Insert or update a roster member on an open connection or transaction.
pub(super) async fn upsert_member_on(
    conn: &mut SqliteConnection,
    team_id: i64,
    member: &NewMember,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (user_id, username, is_active, team_id)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            username = excluded.username,
            is_active = excluded.is_active,
            team_id = excluded.team_id
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&member.user_id)
    .bind(&member.username)
    .bind(member.is_active)
    .bind(team_id)
    .fetch_one(&mut *conn)
    .await
}

pub(super) async fn users_by_team_on(
    conn: &mut SqliteConnection,
    team_id: i64,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE team_id = ? ORDER BY id"
    ))
    .bind(team_id)
    .fetch_all(&mut *conn)
    .await
}

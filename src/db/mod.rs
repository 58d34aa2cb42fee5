//! SQLite persistence.
//!
//! This module handles:
//! - Connection pool management with WAL mode
//! - Schema migrations
//! - `SqliteStore`, the implementation of every capability trait in
//!   [`crate::store`]

pub mod pool;
mod pull_requests;
mod stats;
mod teams;
mod users;

use std::path::Path;
use thiserror::Error;

use pool::DbPool;

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Embedded migrations, applied in order and recorded by name.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    include_str!("migrations/0001_initial_schema.sql"),
)];

/// Initialize the database: create the file if needed and run migrations.
///
/// # Arguments
/// * `db_path` - Path to the SQLite database file
/// * `max_connections` - Upper bound for the connection pool
pub async fn initialize(db_path: &Path, max_connections: u32) -> Result<DbPool, DbError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::Migration(format!("Failed to create database directory: {}", e))
            })?;
        }
    }

    let pool = pool::create_pool(db_path, max_connections).await?;
    run_migrations(&pool).await?;

    log::info!("[db] Database ready at {}", db_path.display());
    Ok(pool)
}

/// Run all pending database migrations.
async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        if applied.is_some() {
            continue;
        }

        for statement in split_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *conn)
                .await
                .map_err(|e| DbError::Migration(format!("{}: {}", name, e)))?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await?;

        log::info!("[db] Applied migration {}", name);
    }

    Ok(())
}

/// Split a migration script into individual statements.
///
/// `--` comments are dropped and semicolons inside string literals do not
/// terminate a statement.
fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;

    for line in sql.lines() {
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '-' if !in_string && chars.peek() == Some(&'-') => break,
                ';' if !in_string => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}

/// SQLite-backed implementation of the user, team, PR and stats stores.
///
/// Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Fresh migrated database in a temp dir. Keep the `TempDir` alive.
    pub async fn setup_test_store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = initialize(&dir.path().join("test.db"), 5).await.unwrap();
        (dir, SqliteStore::new(pool))
    }

    /// A user row with no team, which the public operations never produce.
    pub async fn insert_teamless_user(store: &SqliteStore, user_id: &str) -> crate::models::User {
        sqlx::query_as(
            r#"
            INSERT INTO users (user_id, username, is_active, team_id)
            VALUES (?, ?, 1, NULL)
            RETURNING id, user_id, username, is_active, team_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&store.pool)
        .await
        .unwrap()
    }
}

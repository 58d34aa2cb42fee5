//! SQLite connection pool with WAL mode.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Create a new connection pool with WAL mode enabled.
///
/// Writers serialize on SQLite's database lock; `busy_timeout` makes a
/// contending writer wait for the lock instead of failing immediately.
///
/// # Arguments
/// * `db_path` - Path to the SQLite database file
/// * `max_connections` - Upper bound for pooled connections
pub async fn create_pool(db_path: &Path, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await?;

    let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;

    log::debug!(
        "[db] Pool opened at {} (journal_mode={}, max_connections={})",
        db_path.display(),
        mode.0,
        max_connections
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_pool_with_wal_and_foreign_keys() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let pool = create_pool(&db_path, 3).await.unwrap();

        let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.0.to_lowercase(), "wal");

        let fk: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(fk.0, 1);
    }

    #[tokio::test]
    async fn test_pool_requires_existing_parent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("subdir/test.db");

        // create_if_missing only creates the file, not directories
        assert!(create_pool(&db_path, 1).await.is_err());

        std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();
        let pool = create_pool(&db_path, 1).await.unwrap();
        let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(result.0, 1);
    }
}

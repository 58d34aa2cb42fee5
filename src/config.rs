//! Process configuration, read once at startup from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_DATABASE_PATH: &str = "reviewer-appointment.db";
pub const DEFAULT_SERVER_PORT: u16 = 8081;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database file; parent directories are created on startup.
    pub database_path: PathBuf,
    pub server_port: u16,
    pub db_max_connections: u32,
    /// Seed for deterministic reviewer selection. `None` uses the thread RNG.
    pub selector_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            server_port: DEFAULT_SERVER_PORT,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            selector_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset or blank keys fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let server_port = parse_var(get("SERVER_PORT"), "SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT);

        let db_max_connections = parse_var(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        if db_max_connections == 0 {
            return Err(AppError::invalid_input_field(
                "DB_MAX_CONNECTIONS must be at least 1",
                "DB_MAX_CONNECTIONS",
            ));
        }

        let selector_seed = parse_var(get("SELECTOR_SEED"), "SELECTOR_SEED")?;

        Ok(Self {
            database_path,
            server_port,
            db_max_connections,
            selector_seed,
        })
    }
}

fn parse_var<T: FromStr>(value: Option<String>, key: &str) -> Result<Option<T>, AppError> {
    value
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                AppError::invalid_input_field(format!("{} has invalid value '{}'", key, raw), key)
            })
        })
        .transpose()
}

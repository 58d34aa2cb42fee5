//! Reviewer Appointment - assigns and reassigns PR reviewers within teams.
//!
//! The library exposes the assignment engine, its SQLite-backed stores and
//! the HTTP router; the binary wires them together with process config.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod store;

use config::Config;
use error::AppError;

/// Open the database, build the services and serve until shutdown.
pub async fn run(config: Config) -> Result<(), AppError> {
    log::info!(
        "[server] Starting reviewer-appointment v{} (database {:?})",
        env!("CARGO_PKG_VERSION"),
        config.database_path
    );

    let pool = db::initialize(&config.database_path, config.db_max_connections).await?;
    let store = db::SqliteStore::new(pool);
    let state = server::AppState::new(store, server::selector_for(&config));

    server::serve(&config, state).await
}

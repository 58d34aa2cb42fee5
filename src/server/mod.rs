//! HTTP server: shared state, router and lifecycle.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::db::SqliteStore;
use crate::error::AppError;
use crate::services::{
    AssignmentService, CandidateSelector, RandomSelector, SeededSelector, TeamService, UserService,
};
use crate::store::StatsStore;

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub assignment: AssignmentService,
    pub teams: TeamService,
    pub users: UserService,
    pub stats: Arc<dyn StatsStore>,
}

impl AppState {
    /// Wire every service onto one SQLite store.
    pub fn new(store: SqliteStore, selector: Arc<dyn CandidateSelector>) -> Self {
        let store = Arc::new(store);
        Self {
            assignment: AssignmentService::new(store.clone(), store.clone(), store.clone(), selector),
            teams: TeamService::new(store.clone(), store.clone()),
            users: UserService::new(store.clone(), store.clone()),
            stats: store,
        }
    }
}

/// Seeded selection when `SELECTOR_SEED` is set, thread RNG otherwise.
pub fn selector_for(config: &Config) -> Arc<dyn CandidateSelector> {
    match config.selector_seed {
        Some(seed) => {
            log::info!("[server] Using seeded reviewer selection (seed {})", seed);
            Arc::new(SeededSelector::new(seed))
        }
        None => Arc::new(RandomSelector),
    }
}

pub fn router(state: AppState) -> Router {
    api::api_routes().with_state(state)
}

/// Bind `0.0.0.0:<port>` and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, state: AppState) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to port {}: {}", config.server_port, e)))?;

    log::info!("[server] Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    log::info!("[server] Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[server] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("[server] Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("[server] Shutdown signal received");
}

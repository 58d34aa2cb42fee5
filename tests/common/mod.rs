//! Shared setup for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use reviewer_appointment::db::{self, SqliteStore};
use reviewer_appointment::models::NewMember;
use reviewer_appointment::server::AppState;
use reviewer_appointment::services::{CandidateSelector, RandomSelector, SeededSelector};
use tempfile::TempDir;

/// Fresh migrated database in a temp dir. Keep the `TempDir` alive.
pub async fn setup_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::initialize(&dir.path().join("reviewers.db"), 5)
        .await
        .unwrap();
    (dir, SqliteStore::new(pool))
}

pub async fn setup_state() -> (TempDir, AppState) {
    setup_state_with(Arc::new(RandomSelector)).await
}

pub async fn setup_seeded_state(seed: u64) -> (TempDir, AppState) {
    setup_state_with(Arc::new(SeededSelector::new(seed))).await
}

async fn setup_state_with(selector: Arc<dyn CandidateSelector>) -> (TempDir, AppState) {
    let (dir, store) = setup_store().await;
    (dir, AppState::new(store, selector))
}

/// Roster of active members.
pub fn members(ids: &[&str]) -> Vec<NewMember> {
    ids.iter()
        .map(|id| NewMember::new(*id, format!("User {}", id), true))
        .collect()
}

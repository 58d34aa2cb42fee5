//! Read-only aggregates over PRs and reviewers.

use serde::Serialize;
use sqlx::FromRow;
use std::collections::BTreeMap;

/// Number of reviewer associations held by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ReviewerStats {
    pub user_id: String,
    pub username: String,
    pub review_count: i64,
}

/// Service-wide counters.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_prs: i64,
    pub total_users: i64,
    pub active_users: i64,
    /// Keyed by status name; every status is present.
    pub prs_by_status: BTreeMap<String, i64>,
    pub top_reviewers: Vec<ReviewerStats>,
}

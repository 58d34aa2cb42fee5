//! Pull request model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use super::User;

/// Upper bound on reviewers assigned when a PR is created.
pub const MAX_REVIEWERS: usize = 2;

/// Lifecycle status of a pull request. OPEN -> MERGED, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub const ALL: [PrStatus; 2] = [PrStatus::Open, PrStatus::Merged];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string that is neither `OPEN` nor `MERGED`.
#[derive(Debug, Error)]
#[error("unknown PR status: {0}")]
pub struct UnknownStatus(pub String);

impl TryFrom<String> for PrStatus {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            _ => Err(UnknownStatus(s)),
        }
    }
}

/// A pull request with its current reviewer set.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PullRequest {
    /// Surrogate key.
    #[serde(skip)]
    pub id: i64,

    /// External id, unique and immutable.
    pub pull_request_id: String,

    pub pull_request_name: String,

    /// Surrogate key of the author.
    #[serde(skip)]
    pub author_id: i64,

    /// External id of the author.
    #[serde(rename = "author_id")]
    pub author_user_id: String,

    #[sqlx(try_from = "String")]
    pub status: PrStatus,

    /// Set exactly once, on the OPEN -> MERGED transition (Unix).
    pub merged_at: Option<i64>,

    /// Creation timestamp (Unix).
    pub created_at: i64,

    /// Current reviewers. Filled by the store.
    #[sqlx(skip)]
    pub reviewers: Vec<User>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PrStatus::Merged
    }

    /// Whether the user (by surrogate key) is currently a reviewer.
    pub fn has_reviewer(&self, user_id: i64) -> bool {
        self.reviewers.iter().any(|r| r.id == user_id)
    }

    /// External ids of the current reviewers.
    pub fn reviewer_user_ids(&self) -> Vec<String> {
        self.reviewers.iter().map(|r| r.user_id.clone()).collect()
    }
}

/// Input for inserting a new OPEN pull request.
#[derive(Debug, Clone)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: i64,
}

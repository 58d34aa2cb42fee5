//! Storage capability traits.
//!
//! Services depend only on these traits, never on a concrete backend.
//! [`crate::db::SqliteStore`] implements all of them.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewMember, NewPullRequest, PullRequest, Stats, Team, User};

/// Users and their activity flags.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by external id.
    async fn get_user_by_external_id(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// All members of a team, active and inactive.
    async fn get_users_by_team(&self, team_id: i64) -> Result<Vec<User>, AppError>;

    /// Create the user under `team_id`, or update name, active flag and team
    /// of the existing user with the same external id.
    async fn upsert_member(&self, team_id: i64, member: &NewMember) -> Result<User, AppError>;

    /// Set the activity flag. Returns `None` if the user does not exist.
    async fn set_user_active(&self, user_id: &str, is_active: bool)
        -> Result<Option<User>, AppError>;

    /// Deactivate every member of a team. Returns the number of users changed.
    async fn deactivate_all_in_team(&self, team_id: i64) -> Result<u64, AppError>;
}

/// Teams. Member lists are resolved through [`UserStore::get_users_by_team`].
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Insert a team. Fails with `AlreadyExists(TEAM_EXISTS)` if the name is taken,
    /// including when a concurrent insert of the same name wins.
    async fn create_team(&self, name: &str) -> Result<Team, AppError>;

    /// Insert a team and upsert every roster member into it as one unit.
    ///
    /// Either the team exists with its whole roster or nothing changed. Fails
    /// with `AlreadyExists(TEAM_EXISTS)` like [`TeamStore::create_team`].
    async fn create_team_with_members(
        &self,
        name: &str,
        members: &[NewMember],
    ) -> Result<Team, AppError>;

    async fn get_team_by_id(&self, team_id: i64) -> Result<Option<Team>, AppError>;

    async fn get_team_by_name(&self, name: &str) -> Result<Option<Team>, AppError>;

    async fn team_exists(&self, name: &str) -> Result<bool, AppError>;
}

/// Result of an atomic reviewer replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// Old reviewer removed and this candidate added, in one unit.
    Replaced { new_reviewer_id: i64 },
    /// The PR is merged; nothing changed.
    PrMerged,
    /// The old reviewer is not (or no longer) assigned; nothing changed.
    NotAssigned,
    /// No listed candidate is still active and unassigned; nothing changed.
    NoCandidate,
}

/// Pull requests and reviewer associations.
#[async_trait]
pub trait PrStore: Send + Sync {
    /// Insert an OPEN PR with no reviewers. Fails with `AlreadyExists(PR_EXISTS)`
    /// if the external id is taken, including when a concurrent insert wins.
    async fn create_pr(&self, new_pr: &NewPullRequest) -> Result<PullRequest, AppError>;

    /// Insert an OPEN PR together with its initial reviewers as one unit.
    ///
    /// A PR never becomes visible with only part of `reviewer_ids`. Fails with
    /// `AlreadyExists(PR_EXISTS)` like [`PrStore::create_pr`].
    async fn create_pr_with_reviewers(
        &self,
        new_pr: &NewPullRequest,
        reviewer_ids: &[i64],
    ) -> Result<PullRequest, AppError>;

    /// Look up a PR by external id, with its current reviewers.
    async fn get_pr_by_external_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError>;

    /// Transition OPEN -> MERGED and stamp `merged_at`.
    ///
    /// Returns `false` without writing if the PR was not OPEN, so a racing
    /// second merge can never overwrite the first stamp.
    async fn mark_merged(&self, pr_id: i64, merged_at: i64) -> Result<bool, AppError>;

    /// Add a reviewer association. Adding an existing pair is a no-op.
    async fn add_reviewer(&self, pr_id: i64, reviewer_id: i64) -> Result<(), AppError>;

    /// Remove a reviewer association. Fails with `NotFound` if the pair did not exist.
    async fn remove_reviewer(&self, pr_id: i64, reviewer_id: i64) -> Result<(), AppError>;

    async fn list_reviewers(&self, pr_id: i64) -> Result<Vec<User>, AppError>;

    /// Atomically remove `old_reviewer_id` and add the first entry of
    /// `candidates` that is still active and not yet a reviewer.
    ///
    /// The removal only applies to an OPEN PR that currently has the old
    /// reviewer. Either both mutations become visible or neither does.
    async fn replace_reviewer(
        &self,
        pr_id: i64,
        old_reviewer_id: i64,
        candidates: &[i64],
    ) -> Result<ReplaceOutcome, AppError>;

    /// PRs (any status) where the user is currently a reviewer.
    async fn list_prs_by_reviewer(&self, reviewer_id: i64) -> Result<Vec<PullRequest>, AppError>;
}

/// Read-only aggregates.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn stats(&self, top_reviewers_limit: i64) -> Result<Stats, AppError>;
}

//! Reviewer assignment engine.
//!
//! Creates PRs with automatically picked reviewers, merges them idempotently
//! and replaces a reviewer with another active teammate. Every call re-reads
//! the stores; nothing is cached between requests.

use std::sync::Arc;

use chrono::Utc;

use super::selector::CandidateSelector;
use crate::error::AppError;
use crate::models::{NewPullRequest, PullRequest, User, MAX_REVIEWERS};
use crate::store::{PrStore, ReplaceOutcome, TeamStore, UserStore};

/// Orchestrates PR creation, merge and reviewer reassignment.
#[derive(Clone)]
pub struct AssignmentService {
    prs: Arc<dyn PrStore>,
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
    selector: Arc<dyn CandidateSelector>,
}

impl AssignmentService {
    pub fn new(
        prs: Arc<dyn PrStore>,
        users: Arc<dyn UserStore>,
        teams: Arc<dyn TeamStore>,
        selector: Arc<dyn CandidateSelector>,
    ) -> Self {
        Self {
            prs,
            users,
            teams,
            selector,
        }
    }

    /// Create an OPEN PR and assign up to [`MAX_REVIEWERS`] active teammates
    /// of the author.
    ///
    /// # Errors
    /// * `AlreadyExists(PR_EXISTS)` if the id is taken, also when a concurrent
    ///   create of the same id wins the insert
    /// * `NotFound` if the author or the author's team is unknown
    pub async fn create_pr(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_user_id: &str,
    ) -> Result<PullRequest, AppError> {
        if self.prs.get_pr_by_external_id(pr_id).await?.is_some() {
            return Err(AppError::pr_exists(pr_id));
        }

        let author = self
            .users
            .get_user_by_external_id(author_user_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Author", author_user_id))?;
        let team_id = self.resolve_team(&author).await?;

        let pool: Vec<User> = self
            .users
            .get_users_by_team(team_id)
            .await?
            .into_iter()
            .filter(|u| u.is_active && u.id != author.id)
            .collect();
        log::debug!("[assign] {} candidate reviewers for {}", pool.len(), pr_id);

        let chosen: Vec<i64> = self
            .selector
            .select(pool, MAX_REVIEWERS)
            .iter()
            .map(|u| u.id)
            .collect();

        // The PR row and its reviewers commit together.
        let pr = self
            .prs
            .create_pr_with_reviewers(
                &NewPullRequest {
                    pull_request_id: pr_id.to_string(),
                    pull_request_name: pr_name.to_string(),
                    author_id: author.id,
                },
                &chosen,
            )
            .await?;

        log::info!(
            "[assign] Created PR {} by {} with reviewers {:?}",
            pr_id,
            author_user_id,
            pr.reviewer_user_ids()
        );
        Ok(pr)
    }

    /// Mark a PR as MERGED. Merging an already merged PR returns it unchanged.
    ///
    /// # Errors
    /// * `NotFound` if the PR is unknown
    pub async fn merge_pr(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        let pr = self.get_pr(pr_id).await?;
        if pr.is_merged() {
            log::debug!("[assign] PR {} already merged", pr_id);
            return Ok(pr);
        }

        if self.prs.mark_merged(pr.id, Utc::now().timestamp()).await? {
            log::info!("[assign] Merged PR {}", pr_id);
        } else {
            log::debug!("[assign] PR {} was merged concurrently", pr_id);
        }

        self.get_pr(pr_id).await
    }

    /// Replace `old_user_id` on the PR with a random active member of the old
    /// reviewer's team. Returns the new reviewer's external id.
    ///
    /// The author, the old reviewer and everyone already reviewing the PR are
    /// never picked. Removal and addition are applied as one unit.
    ///
    /// # Errors
    /// * `NotFound` if the PR, the old reviewer or their team is unknown
    /// * `InvalidState(PR_MERGED)` if the PR is merged
    /// * `PreconditionFailed(NOT_ASSIGNED)` if the user is not a reviewer of the PR
    /// * `PreconditionFailed(NO_CANDIDATE)` if nobody is eligible; the old
    ///   reviewer stays assigned
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_user_id: &str,
    ) -> Result<String, AppError> {
        let pr = self.get_pr(pr_id).await?;
        if pr.is_merged() {
            return Err(AppError::pr_merged(pr_id));
        }

        let old = self
            .users
            .get_user_by_external_id(old_user_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Reviewer", old_user_id))?;

        if !pr.has_reviewer(old.id) {
            log::warn!("[assign] {} is not a reviewer of {}", old_user_id, pr_id);
            return Err(AppError::not_assigned(old_user_id, pr_id));
        }

        let team_id = self.resolve_team(&old).await?;

        let pool: Vec<User> = self
            .users
            .get_users_by_team(team_id)
            .await?
            .into_iter()
            .filter(|u| {
                u.is_active && u.id != pr.author_id && u.id != old.id && !pr.has_reviewer(u.id)
            })
            .collect();

        if pool.is_empty() {
            log::warn!("[assign] No replacement for {} on {}", old_user_id, pr_id);
            return Err(AppError::no_candidate(pr_id));
        }

        // A full random permutation: the store takes the first entry that is
        // still eligible once it holds the write lock.
        let size = pool.len();
        let ordered = self.selector.select(pool, size);
        let candidate_ids: Vec<i64> = ordered.iter().map(|u| u.id).collect();

        match self
            .prs
            .replace_reviewer(pr.id, old.id, &candidate_ids)
            .await?
        {
            ReplaceOutcome::Replaced { new_reviewer_id } => {
                let new_reviewer = ordered
                    .into_iter()
                    .find(|u| u.id == new_reviewer_id)
                    .ok_or_else(|| AppError::internal("replacement outside candidate pool"))?;
                log::info!(
                    "[assign] Replaced {} with {} on {}",
                    old_user_id,
                    new_reviewer.user_id,
                    pr_id
                );
                Ok(new_reviewer.user_id)
            }
            ReplaceOutcome::PrMerged => Err(AppError::pr_merged(pr_id)),
            ReplaceOutcome::NotAssigned => Err(AppError::not_assigned(old_user_id, pr_id)),
            ReplaceOutcome::NoCandidate => Err(AppError::no_candidate(pr_id)),
        }
    }

    /// Load a PR with its current reviewers.
    pub async fn get_pr(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        self.prs
            .get_pr_by_external_id(pr_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("PullRequest", pr_id))
    }

    async fn resolve_team(&self, user: &User) -> Result<i64, AppError> {
        let team_id = user
            .team_id
            .ok_or_else(|| AppError::not_found_with_id("Team", format!("of user {}", user.user_id)))?;

        match self.teams.get_team_by_id(team_id).await? {
            Some(team) => Ok(team.id),
            None => Err(AppError::not_found_with_id("Team", team_id.to_string())),
        }
    }
}

//! `PrStore` over SQLite.
//!
//! Reviewer replacement runs in one transaction whose first statement is a
//! write, so SQLite hands it the write lock before anything is read. Two
//! replacements on the same PR therefore serialize, and a dropped future
//! rolls the transaction back.

use async_trait::async_trait;

use super::SqliteStore;
use crate::error::{is_unique_violation, AppError};
use crate::models::{NewPullRequest, PullRequest, User};
use crate::store::{PrStore, ReplaceOutcome};

const PR_SELECT: &str = r#"
    SELECT pr.id, pr.pull_request_id, pr.pull_request_name, pr.author_id,
           u.user_id AS author_user_id, pr.status, pr.merged_at, pr.created_at
    FROM pull_requests pr
    JOIN users u ON u.id = pr.author_id
"#;

impl SqliteStore {
    /// Attach the current reviewer set to a loaded PR row.
    async fn with_reviewers(&self, mut pr: PullRequest) -> Result<PullRequest, AppError> {
        pr.reviewers = self.list_reviewers(pr.id).await?;
        Ok(pr)
    }

    async fn get_pr_by_id(&self, pr_id: i64) -> Result<Option<PullRequest>, AppError> {
        let pr = sqlx::query_as::<_, PullRequest>(&format!("{PR_SELECT} WHERE pr.id = ?"))
            .bind(pr_id)
            .fetch_optional(&self.pool)
            .await?;

        match pr {
            Some(pr) => Ok(Some(self.with_reviewers(pr).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PrStore for SqliteStore {
    async fn create_pr(&self, new_pr: &NewPullRequest) -> Result<PullRequest, AppError> {
        self.create_pr_with_reviewers(new_pr, &[]).await
    }

    async fn create_pr_with_reviewers(
        &self,
        new_pr: &NewPullRequest,
        reviewer_ids: &[i64],
    ) -> Result<PullRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status)
            VALUES (?, ?, ?, 'OPEN')
            RETURNING id
            "#,
        )
        .bind(&new_pr.pull_request_id)
        .bind(&new_pr.pull_request_name)
        .bind(new_pr.author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::pr_exists(&new_pr.pull_request_id)
            } else {
                AppError::database_with_op(e.to_string(), "create_pr")
            }
        })?;

        for &reviewer_id in reviewer_ids {
            sqlx::query("INSERT OR IGNORE INTO pr_reviewers (pr_id, reviewer_id) VALUES (?, ?)")
                .bind(id)
                .bind(reviewer_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database_with_op(e.to_string(), "add_reviewer"))?;
        }

        tx.commit().await?;

        self.get_pr_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal("created PR vanished"))
    }

    async fn get_pr_by_external_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
        let pr = sqlx::query_as::<_, PullRequest>(&format!(
            "{PR_SELECT} WHERE pr.pull_request_id = ?"
        ))
        .bind(pr_id)
        .fetch_optional(&self.pool)
        .await?;

        match pr {
            Some(pr) => Ok(Some(self.with_reviewers(pr).await?)),
            None => Ok(None),
        }
    }

    async fn mark_merged(&self, pr_id: i64, merged_at: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE pull_requests SET status = 'MERGED', merged_at = ? WHERE id = ? AND status = 'OPEN'",
        )
        .bind(merged_at)
        .bind(pr_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_reviewer(&self, pr_id: i64, reviewer_id: i64) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO pr_reviewers (pr_id, reviewer_id) VALUES (?, ?)")
            .bind(pr_id)
            .bind(reviewer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database_with_op(e.to_string(), "add_reviewer"))?;

        Ok(())
    }

    async fn remove_reviewer(&self, pr_id: i64, reviewer_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM pr_reviewers WHERE pr_id = ? AND reviewer_id = ?")
            .bind(pr_id)
            .bind(reviewer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found_with_id(
                "ReviewerAssignment",
                format!("{}/{}", pr_id, reviewer_id),
            ));
        }

        Ok(())
    }

    async fn list_reviewers(&self, pr_id: i64) -> Result<Vec<User>, AppError> {
        let reviewers = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.user_id, u.username, u.is_active, u.team_id, u.created_at
            FROM pr_reviewers r
            JOIN users u ON u.id = r.reviewer_id
            WHERE r.pr_id = ?
            ORDER BY u.user_id
            "#,
        )
        .bind(pr_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviewers)
    }

    async fn replace_reviewer(
        &self,
        pr_id: i64,
        old_reviewer_id: i64,
        candidates: &[i64],
    ) -> Result<ReplaceOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM pr_reviewers
            WHERE pr_id = ? AND reviewer_id = ?
              AND EXISTS (SELECT 1 FROM pull_requests WHERE id = ? AND status = 'OPEN')
            "#,
        )
        .bind(pr_id)
        .bind(old_reviewer_id)
        .bind(pr_id)
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() == 0 {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM pull_requests WHERE id = ?")
                    .bind(pr_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Ok(match status.as_deref() {
                Some("MERGED") => ReplaceOutcome::PrMerged,
                _ => ReplaceOutcome::NotAssigned,
            });
        }

        for &candidate in candidates {
            if candidate == old_reviewer_id {
                continue;
            }

            let inserted = sqlx::query(
                r#"
                INSERT INTO pr_reviewers (pr_id, reviewer_id)
                SELECT ?, u.id FROM users u
                WHERE u.id = ? AND u.is_active = 1
                  AND NOT EXISTS (
                      SELECT 1 FROM pr_reviewers WHERE pr_id = ? AND reviewer_id = u.id
                  )
                "#,
            )
            .bind(pr_id)
            .bind(candidate)
            .bind(pr_id)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 1 {
                tx.commit().await?;
                return Ok(ReplaceOutcome::Replaced {
                    new_reviewer_id: candidate,
                });
            }
        }

        tx.rollback().await?;
        Ok(ReplaceOutcome::NoCandidate)
    }

    async fn list_prs_by_reviewer(&self, reviewer_id: i64) -> Result<Vec<PullRequest>, AppError> {
        let rows = sqlx::query_as::<_, PullRequest>(&format!(
            r#"{PR_SELECT}
            JOIN pr_reviewers r ON r.pr_id = pr.id
            WHERE r.reviewer_id = ?
            ORDER BY pr.created_at, pr.id"#
        ))
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut prs = Vec::with_capacity(rows.len());
        for pr in rows {
            prs.push(self.with_reviewers(pr).await?);
        }
        Ok(prs)
    }
}

//! `StatsStore` over SQLite.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::SqliteStore;
use crate::error::AppError;
use crate::models::{PrStatus, ReviewerStats, Stats};
use crate::store::StatsStore;

#[async_trait]
impl StatsStore for SqliteStore {
    async fn stats(&self, top_reviewers_limit: i64) -> Result<Stats, AppError> {
        let total_prs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pull_requests")
            .fetch_one(&self.pool)
            .await?;

        let (total_users, active_users): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) FROM users",
        )
        .fetch_one(&self.pool)
        .await?;

        let by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM pull_requests GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut prs_by_status: BTreeMap<String, i64> = PrStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        prs_by_status.extend(by_status);

        let top_reviewers = sqlx::query_as::<_, ReviewerStats>(
            r#"
            SELECT u.user_id, u.username, COUNT(*) AS review_count
            FROM users u
            JOIN pr_reviewers r ON r.reviewer_id = u.id
            WHERE u.is_active = 1
            GROUP BY u.id, u.user_id, u.username
            ORDER BY review_count DESC, u.user_id ASC
            LIMIT ?
            "#,
        )
        .bind(top_reviewers_limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(Stats {
            total_prs,
            total_users,
            active_users,
            prs_by_status,
            top_reviewers,
        })
    }
}

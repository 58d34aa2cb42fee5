//! Per-user operations: activity flag and review queue.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{PullRequest, User};
use crate::store::{PrStore, UserStore};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    prs: Arc<dyn PrStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, prs: Arc<dyn PrStore>) -> Self {
        Self { users, prs }
    }

    /// Set a user's activity flag. Inactive users are never picked as reviewers,
    /// but keep their existing assignments.
    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let user = self
            .users
            .set_user_active(user_id, is_active)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("User", user_id))?;

        log::info!("[user] {} is_active={}", user_id, is_active);
        Ok(user)
    }

    /// PRs where the user is currently a reviewer.
    pub async fn get_review_prs(&self, user_id: &str) -> Result<Vec<PullRequest>, AppError> {
        let user = self
            .users
            .get_user_by_external_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("User", user_id))?;

        self.prs.list_prs_by_reviewer(user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_store;
    use crate::models::{NewMember, NewPullRequest};
    use crate::store::TeamStore;

    #[tokio::test]
    async fn test_set_is_active_round_trip() {
        let (_dir, store) = setup_test_store().await;
        let team = store.create_team("backend").await.unwrap();
        store
            .upsert_member(team.id, &NewMember::new("u1", "Alice", true))
            .await
            .unwrap();
        let shared = Arc::new(store);
        let service = UserService::new(shared.clone(), shared);

        let user = service.set_is_active("u1", false).await.unwrap();
        assert!(!user.is_active);
        let user = service.set_is_active("u1", true).await.unwrap();
        assert!(user.is_active);

        assert!(service.set_is_active("ghost", false).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_review_prs() {
        let (_dir, store) = setup_test_store().await;
        let team = store.create_team("backend").await.unwrap();
        let author = store
            .upsert_member(team.id, &NewMember::new("u1", "Alice", true))
            .await
            .unwrap();
        let reviewer = store
            .upsert_member(team.id, &NewMember::new("u2", "Bob", true))
            .await
            .unwrap();
        let pr = store
            .create_pr(&NewPullRequest {
                pull_request_id: "pr-1".into(),
                pull_request_name: "Add X".into(),
                author_id: author.id,
            })
            .await
            .unwrap();
        store.add_reviewer(pr.id, reviewer.id).await.unwrap();
        let shared = Arc::new(store);
        let service = UserService::new(shared.clone(), shared);

        let prs = service.get_review_prs("u2").await.unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].pull_request_id, "pr-1");

        assert!(service.get_review_prs("u1").await.unwrap().is_empty());
        assert!(service.get_review_prs("ghost").await.unwrap_err().is_not_found());
    }
}

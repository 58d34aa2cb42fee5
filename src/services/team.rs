//! Team lifecycle: creation with member upsert, lookup and mass deactivation.

use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewMember, Team};
use crate::store::{TeamStore, UserStore};

#[derive(Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamStore>,
    users: Arc<dyn UserStore>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamStore>, users: Arc<dyn UserStore>) -> Self {
        Self { teams, users }
    }

    /// Create a team and move every listed member into it.
    ///
    /// Members that already exist are updated (name, active flag, team);
    /// the rest are created. The team and its roster commit together.
    /// Returns the team with its persisted members.
    pub async fn create_team(&self, name: &str, members: &[NewMember]) -> Result<Team, AppError> {
        if self.teams.team_exists(name).await? {
            return Err(AppError::team_exists(name));
        }

        let team = self.teams.create_team_with_members(name, members).await?;

        log::info!(
            "[team] Created team {} with {} members",
            team.name,
            team.members.len()
        );
        Ok(team)
    }

    /// Team with its full current membership, active and inactive.
    pub async fn get_team(&self, name: &str) -> Result<Team, AppError> {
        let mut team = self
            .teams
            .get_team_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found_with_id("Team", name))?;
        team.members = self.users.get_users_by_team(team.id).await?;
        Ok(team)
    }

    /// Deactivate every member of the team. Reviewer history is untouched.
    ///
    /// Returns the number of users that were active before the call.
    pub async fn deactivate_team_users(&self, team_id: i64) -> Result<u64, AppError> {
        if self.teams.get_team_by_id(team_id).await?.is_none() {
            return Err(AppError::not_found_with_id("Team", team_id.to_string()));
        }

        let changed = self.users.deactivate_all_in_team(team_id).await?;
        log::info!("[team] Deactivated {} users in team {}", changed, team_id);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_store;
    use crate::db::SqliteStore;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, SqliteStore, TeamService) {
        let (dir, store) = setup_test_store().await;
        let shared = Arc::new(store.clone());
        (dir, store, TeamService::new(shared.clone(), shared))
    }

    #[tokio::test]
    async fn test_create_team_with_new_members() {
        let (_dir, _store, service) = setup().await;

        let team = service
            .create_team(
                "backend",
                &[NewMember::new("u1", "Alice", true), NewMember::new("u2", "Bob", false)],
            )
            .await
            .unwrap();

        assert_eq!(team.name, "backend");
        let ids: Vec<&str> = team.members.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(team.members.iter().all(|u| u.team_id == Some(team.id)));
        assert!(!team.members[1].is_active);
    }

    #[tokio::test]
    async fn test_create_team_rejects_taken_name() {
        let (_dir, _store, service) = setup().await;
        service.create_team("backend", &[]).await.unwrap();

        let err = service.create_team("backend", &[]).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TeamExists));
    }

    #[tokio::test]
    async fn test_create_team_moves_existing_user() {
        let (_dir, _store, service) = setup().await;
        service
            .create_team("backend", &[NewMember::new("u1", "Alice", true)])
            .await
            .unwrap();

        let frontend = service
            .create_team("frontend", &[NewMember::new("u1", "Alice Smith", false)])
            .await
            .unwrap();

        assert_eq!(frontend.members.len(), 1);
        assert_eq!(frontend.members[0].username, "Alice Smith");
        assert!(!frontend.members[0].is_active);
        assert!(service.get_team("backend").await.unwrap().members.is_empty());
    }

    #[tokio::test]
    async fn test_get_team_not_found() {
        let (_dir, _store, service) = setup().await;
        let err = service.get_team("ghosts").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_deactivate_team_users() {
        let (_dir, _store, service) = setup().await;
        let team = service
            .create_team(
                "backend",
                &[NewMember::new("u1", "Alice", true), NewMember::new("u2", "Bob", true)],
            )
            .await
            .unwrap();

        assert_eq!(service.deactivate_team_users(team.id).await.unwrap(), 2);

        let team = service.get_team("backend").await.unwrap();
        assert!(team.members.iter().all(|u| !u.is_active));

        let err = service.deactivate_team_users(team.id + 100).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

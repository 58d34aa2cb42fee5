//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team member who may author PRs and be picked as a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    /// Surrogate key.
    #[serde(skip)]
    pub id: i64,

    /// Externally supplied identity, unique and immutable.
    pub user_id: String,

    pub username: String,

    /// Only active users are eligible as reviewers.
    pub is_active: bool,

    /// Owning team; `None` only before the first team assignment.
    pub team_id: Option<i64>,

    /// Creation timestamp (Unix).
    pub created_at: i64,
}

/// Roster entry submitted when creating a team.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMember {
    pub user_id: String,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_defaults_to_active() {
        let member: NewMember =
            serde_json::from_str(r#"{"user_id":"u1","username":"Alice"}"#).unwrap();
        assert!(member.is_active);
    }

    #[test]
    fn test_surrogate_id_not_serialized() {
        let user = User {
            id: 42,
            user_id: "u1".into(),
            username: "Alice".into(),
            is_active: true,
            team_id: Some(1),
            created_at: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["user_id"], "u1");
    }
}

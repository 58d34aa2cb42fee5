//! Team model.

use serde::Serialize;
use sqlx::FromRow;

use super::User;

/// A named group of users. Members are the users whose `team_id` points here.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Team {
    /// Surrogate key, also used to address the team for mass deactivation.
    #[serde(rename = "team_id")]
    pub id: i64,

    #[serde(rename = "team_name")]
    pub name: String,

    /// Creation timestamp (Unix).
    pub created_at: i64,

    /// Current members, active and inactive. Filled by the store.
    #[sqlx(skip)]
    pub members: Vec<User>,
}

//! Data models.
//!
//! These models represent the entities stored in SQLite and returned by the
//! services. All models derive Serialize for the HTTP layer and FromRow for
//! SQLx queries; surrogate keys are never serialized.

pub mod pull_request;
pub mod stats;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{NewPullRequest, PrStatus, PullRequest, MAX_REVIEWERS};
pub use stats::{ReviewerStats, Stats};
pub use team::Team;
pub use user::{NewMember, User};

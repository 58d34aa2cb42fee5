//! Business logic services.
//!
//! Services depend only on the capability traits in [`crate::store`] and are
//! independent of the HTTP layer.

pub mod assignment;
pub mod selector;
pub mod team;
pub mod user;

pub use assignment::AssignmentService;
pub use selector::{CandidateSelector, RandomSelector, SeededSelector};
pub use team::TeamService;
pub use user::UserService;

//! Application error types.
//!
//! Every failure the services return is an `AppError`. Domain failures are
//! tagged by kind (the enum variant) and carry an [`ErrorCode`] that the
//! transport layer turns into a response; storage failures are wrapped into
//! `Database` and never masquerade as a domain kind.

use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable code attached to domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TeamExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
}

impl ErrorCode {
    /// Wire representation, e.g. `PR_MERGED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeamExists => "TEAM_EXISTS",
            Self::PrExists => "PR_EXISTS",
            Self::PrMerged => "PR_MERGED",
            Self::NotAssigned => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level errors.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// A team name or PR id is already taken.
    #[error("Already exists: {message}")]
    AlreadyExists { code: ErrorCode, message: String },

    /// Requested resource not found.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Operation is illegal for the current PR status.
    #[error("Invalid state: {message}")]
    InvalidState { code: ErrorCode, message: String },

    /// A caller-asserted fact is false, or no eligible replacement exists.
    #[error("Precondition failed: {message}")]
    PreconditionFailed { code: ErrorCode, message: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// The PR id is already in use.
    pub fn pr_exists(pr_id: &str) -> Self {
        Self::AlreadyExists {
            code: ErrorCode::PrExists,
            message: format!("PR id {} already exists", pr_id),
        }
    }

    /// The team name is already in use.
    pub fn team_exists(team_name: &str) -> Self {
        Self::AlreadyExists {
            code: ErrorCode::TeamExists,
            message: format!("team_name {} already exists", team_name),
        }
    }

    /// The PR is merged and can no longer be modified.
    pub fn pr_merged(pr_id: &str) -> Self {
        Self::InvalidState {
            code: ErrorCode::PrMerged,
            message: format!("cannot modify merged PR {}", pr_id),
        }
    }

    /// The user is not a reviewer of the PR.
    pub fn not_assigned(user_id: &str, pr_id: &str) -> Self {
        Self::PreconditionFailed {
            code: ErrorCode::NotAssigned,
            message: format!("reviewer {} is not assigned to PR {}", user_id, pr_id),
        }
    }

    /// No active replacement candidate in the reviewer's team.
    pub fn no_candidate(pr_id: &str) -> Self {
        Self::PreconditionFailed {
            code: ErrorCode::NoCandidate,
            message: format!("no active replacement candidate in team for PR {}", pr_id),
        }
    }

    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Domain code of this error, `None` for input, storage and internal failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::AlreadyExists { code, .. }
            | Self::InvalidState { code, .. }
            | Self::PreconditionFailed { code, .. } => Some(*code),
            Self::NotFound { .. } => Some(ErrorCode::NotFound),
            _ => None,
        }
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::database(err.to_string())
    }
}

/// Whether a sqlx error is a UNIQUE/PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

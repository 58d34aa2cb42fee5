//! JSON routes over the services.
//!
//! Handlers validate the request shape, call one service operation and map
//! the result. All domain rules live in the services.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppError;
use crate::models::{NewMember, PullRequest, Stats, Team, User};

/// Number of reviewers listed in `/stats`.
const TOP_REVIEWERS_LIMIT: i64 = 10;

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Serialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(AppError);

impl ApiErr {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::AlreadyExists { code, .. } => (StatusCode::BAD_REQUEST, code.as_str()),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::InvalidState { code, .. } | AppError::PreconditionFailed { code, .. } => {
                (StatusCode::CONFLICT, code.as_str())
            }
            AppError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            AppError::Database { .. } | AppError::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("[server] {}", self.0);
            "internal server error".to_string()
        } else {
            if status == StatusCode::CONFLICT {
                log::warn!("[server] {}", self.0);
            }
            self.0.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: ApiError {
                    code: code.to_string(),
                    message,
                },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiErr {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

/// Reject missing-in-spirit values: empty or whitespace-only strings.
fn require(value: &str, field: &str) -> Result<(), ApiErr> {
    if value.trim().is_empty() {
        return Err(ApiErr(AppError::invalid_input_field(
            format!("{} is required", field),
            field,
        )));
    }
    Ok(())
}

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTeamRequest {
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<NewMember>,
}

#[derive(Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

#[derive(Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct CreatePrRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

#[derive(Deserialize)]
pub struct MergePrRequest {
    pub pull_request_id: String,
}

#[derive(Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct TeamEnvelope {
    pub team: Team,
}

#[derive(Serialize)]
pub struct DeactivateResponse {
    pub status: &'static str,
    pub team_id: i64,
    pub deactivated_count: u64,
}

#[derive(Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Serialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequest>,
}

#[derive(Serialize)]
pub struct PrEnvelope {
    pub pr: PullRequest,
}

#[derive(Serialize)]
pub struct ReassignResponse {
    pub pr: PullRequest,
    pub replaced_by: String,
}

// ── Routes ───────────────────────────────────────────────────────────────────

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/team/add", post(create_team))
        .route("/team/get", get(get_team))
        .route("/teams/{team_id}/deactivate", post(deactivate_team_users))
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_user_reviews))
        .route("/pullRequest/create", post(create_pr))
        .route("/pullRequest/merge", post(merge_pr))
        .route("/pullRequest/reassign", post(reassign_reviewer))
        .route("/stats", get(stats))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /team/add: create a team and upsert its roster.
async fn create_team(
    State(state): State<AppState>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamEnvelope>), ApiErr> {
    let Json(req) = payload?;
    require(&req.team_name, "team_name")?;
    for member in &req.members {
        require(&member.user_id, "members.user_id")?;
        require(&member.username, "members.username")?;
    }

    let team = state.teams.create_team(&req.team_name, &req.members).await?;
    Ok((StatusCode::CREATED, Json(TeamEnvelope { team })))
}

/// GET /team/get?team_name=X
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let Query(params) = query?;
    require(&params.team_name, "team_name")?;

    Ok(Json(state.teams.get_team(&params.team_name).await?))
}

/// POST /teams/{team_id}/deactivate
async fn deactivate_team_users(
    State(state): State<AppState>,
    team_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeactivateResponse>, ApiErr> {
    let Path(team_id) = team_id?;
    let deactivated_count = state.teams.deactivate_team_users(team_id).await?;

    Ok(Json(DeactivateResponse {
        status: "users deactivated",
        team_id,
        deactivated_count,
    }))
}

/// POST /users/setIsActive
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiErr> {
    let Json(req) = payload?;
    require(&req.user_id, "user_id")?;

    let user = state.users.set_is_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserEnvelope { user }))
}

/// GET /users/getReview?user_id=X: PRs the user currently reviews.
async fn get_user_reviews(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviewsResponse>, ApiErr> {
    let Query(params) = query?;
    require(&params.user_id, "user_id")?;

    let pull_requests = state.users.get_review_prs(&params.user_id).await?;
    Ok(Json(UserReviewsResponse {
        user_id: params.user_id,
        pull_requests,
    }))
}

/// POST /pullRequest/create
async fn create_pr(
    State(state): State<AppState>,
    payload: Result<Json<CreatePrRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PrEnvelope>), ApiErr> {
    let Json(req) = payload?;
    require(&req.pull_request_id, "pull_request_id")?;
    require(&req.pull_request_name, "pull_request_name")?;
    require(&req.author_id, "author_id")?;

    let pr = state
        .assignment
        .create_pr(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PrEnvelope { pr })))
}

/// POST /pullRequest/merge
async fn merge_pr(
    State(state): State<AppState>,
    payload: Result<Json<MergePrRequest>, JsonRejection>,
) -> Result<Json<PrEnvelope>, ApiErr> {
    let Json(req) = payload?;
    require(&req.pull_request_id, "pull_request_id")?;

    let pr = state.assignment.merge_pr(&req.pull_request_id).await?;
    Ok(Json(PrEnvelope { pr }))
}

/// POST /pullRequest/reassign
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiErr> {
    let Json(req) = payload?;
    require(&req.pull_request_id, "pull_request_id")?;
    require(&req.old_reviewer_id, "old_reviewer_id")?;

    let replaced_by = state
        .assignment
        .reassign_reviewer(&req.pull_request_id, &req.old_reviewer_id)
        .await?;
    let pr = state.assignment.get_pr(&req.pull_request_id).await?;

    Ok(Json(ReassignResponse { pr, replaced_by }))
}

/// GET /stats
async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiErr> {
    Ok(Json(state.stats.stats(TOP_REVIEWERS_LIMIT).await?))
}

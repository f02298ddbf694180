//! Score endpoints.

use axum::extract::{Path, Query, State};
use serde_json::Value;

use super::{created, message, success, ApiResult, JsonBody, ListResponse};
use crate::auth::{Actor, AdminActor};
use crate::errors::AppError;
use crate::models::{CreateScoreRequest, Score, UpdateScoreRequest};
use crate::services::ScoreService;
use crate::AppState;

/// GET /api/scores - Leaderboard listing.
pub async fn list_scores(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<ListResponse, AppError> {
    let page = ScoreService::new(&state.repo).list(&params).await?;
    Ok(page.into())
}

/// GET /api/scores/{id} - Get a score with its user and game.
pub async fn get_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Value> {
    let score = ScoreService::new(&state.repo).get(&id, &params).await?;
    success(score)
}

/// POST /api/scores - Submit a score for the calling user.
pub async fn create_score(
    State(state): State<AppState>,
    actor: Actor,
    JsonBody(request): JsonBody<CreateScoreRequest>,
) -> ApiResult<Score> {
    let score = ScoreService::new(&state.repo).create(request, &actor).await?;
    created(score)
}

/// PATCH /api/scores/{id} - Update a score.
pub async fn update_score(
    State(state): State<AppState>,
    AdminActor(_): AdminActor,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateScoreRequest>,
) -> ApiResult<Score> {
    let score = ScoreService::new(&state.repo).update(&id, request).await?;
    success(score)
}

/// DELETE /api/scores/{id} - Hide a score.
pub async fn delete_score(
    State(state): State<AppState>,
    AdminActor(_): AdminActor,
    Path(id): Path<String>,
) -> ApiResult<()> {
    ScoreService::new(&state.repo).remove(&id).await?;
    message("Score deactivated successfully")
}

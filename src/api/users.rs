//! User account endpoints.

use axum::extract::{Path, Query, State};
use serde_json::Value;

use super::{created, success, ApiResult, JsonBody, ListResponse};
use crate::auth::{Actor, AdminActor};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::services::UserService;
use crate::AppState;

/// GET /api/users - List users (admin).
pub async fn list_users(
    State(state): State<AppState>,
    AdminActor(actor): AdminActor,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<ListResponse, AppError> {
    let page = UserService::new(&state.repo).list(&params, &actor).await?;
    Ok(page.into())
}

/// GET /api/users/{id} - Get a user (self or admin).
pub async fn get_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Value> {
    let user = UserService::new(&state.repo).get(&id, &params, &actor).await?;
    success(user)
}

/// POST /api/users - Create a user (admin).
pub async fn create_user(
    State(state): State<AppState>,
    AdminActor(actor): AdminActor,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ApiResult<User> {
    let user = UserService::new(&state.repo).create(request, &actor).await?;
    created(user)
}

/// PATCH /api/users/{id} - Update a user (self or admin).
pub async fn update_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> ApiResult<User> {
    let user = UserService::new(&state.repo)
        .update(&id, request, &actor)
        .await?;
    success(user)
}

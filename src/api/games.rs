//! Game catalog endpoints.

use axum::extract::{Path, Query, State};

use super::{created, message, success, ApiResult, DetailResponse, JsonBody, ListResponse};
use crate::auth::{AdminActor, OptionalActor};
use crate::errors::AppError;
use crate::models::{CreateGameRequest, Game, UpdateGameRequest};
use crate::services::GameService;
use crate::AppState;

/// GET /api/games - List games.
pub async fn list_games(
    State(state): State<AppState>,
    actor: OptionalActor,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<ListResponse, AppError> {
    let page = GameService::new(&state.repo)
        .list(&params, actor.role())
        .await?;
    Ok(page.into())
}

/// GET /api/games/{id} - Get a game under the caller's read scope.
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: OptionalActor,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<DetailResponse, AppError> {
    let detail = GameService::new(&state.repo)
        .get(&id, &params, actor.role())
        .await?;
    Ok(DetailResponse(detail))
}

/// POST /api/games - Create a game.
pub async fn create_game(
    State(state): State<AppState>,
    AdminActor(actor): AdminActor,
    JsonBody(request): JsonBody<CreateGameRequest>,
) -> ApiResult<Game> {
    let game = GameService::new(&state.repo).create(request, &actor).await?;
    created(game)
}

/// PATCH /api/games/{id} - Update a game.
pub async fn update_game(
    State(state): State<AppState>,
    AdminActor(_): AdminActor,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateGameRequest>,
) -> ApiResult<Game> {
    let game = GameService::new(&state.repo).update(&id, request).await?;
    success(game)
}

/// DELETE /api/games/{id} - Hide a game.
pub async fn delete_game(
    State(state): State<AppState>,
    AdminActor(_): AdminActor,
    Path(id): Path<String>,
) -> ApiResult<()> {
    GameService::new(&state.repo).remove(&id).await?;
    message("Game deactivated successfully")
}

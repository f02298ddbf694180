use serde_json::Value;

use crate::auth::Actor;
use crate::db::{timestamp, Repository};
use crate::errors::AppError;
use crate::models::{validate_metadata, CreateScoreRequest, Score, UpdateScoreRequest};
use crate::policy;
use crate::query::{Page, QueryPlan, Resource};

pub struct ScoreService<'a> {
    repo: &'a Repository,
}

impl<'a> ScoreService<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Leaderboard listing, highest value first unless `sort` says otherwise.
    pub async fn list(&self, params: &[(String, String)]) -> Result<Page, AppError> {
        let plan = QueryPlan::build(Score::schema(), params, policy::scope_filter(None, None));
        self.repo.query::<Score>(&plan).await
    }

    /// Scores always resolve the requested id, whatever the role.
    pub async fn get(&self, id: &str, params: &[(String, String)]) -> Result<Value, AppError> {
        let plan = QueryPlan::build_detail(Score::schema(), params, policy::pinned(id));
        super::single::<Score>(self.repo, &plan, || {
            AppError::NotFound(format!("Score {} not found", id))
        })
        .await
    }

    pub async fn create(&self, request: CreateScoreRequest, actor: &Actor) -> Result<Score, AppError> {
        let (Some(game_id), Some(value)) = (request.game, request.value) else {
            return Err(AppError::Validation(
                "Game and value are required".to_string(),
            ));
        };
        if !value.is_finite() {
            return Err(AppError::Validation("Value must be a finite number".to_string()));
        }
        let metadata = request.metadata.unwrap_or_default();
        validate_metadata(&metadata)?;

        if self.repo.get_game(&game_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Game {} not found", game_id)));
        }
        if self.repo.get_user(&actor.id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", actor.id)));
        }

        let now = timestamp();
        let score = Score {
            id: uuid::Uuid::new_v4().to_string(),
            user: actor.id.clone(),
            game: game_id,
            value,
            metadata,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_score(&score).await?;
        tracing::info!(
            score_id = %score.id,
            game_id = %score.game,
            user_id = %score.user,
            value = score.value,
            "Recorded score"
        );
        Ok(score)
    }

    /// Partial update; owner and game never change.
    pub async fn update(&self, id: &str, request: UpdateScoreRequest) -> Result<Score, AppError> {
        let mut score = self.find(id).await?;

        if let Some(value) = request.value {
            if !value.is_finite() {
                return Err(AppError::Validation("Value must be a finite number".to_string()));
            }
            score.value = value;
        }
        if let Some(metadata) = request.metadata {
            validate_metadata(&metadata)?;
            score.metadata = metadata;
        }
        if let Some(is_active) = request.is_active {
            score.is_active = is_active;
        }
        score.updated_at = timestamp();

        self.repo.save_score(&score).await?;
        tracing::info!(score_id = %score.id, "Updated score");
        Ok(score)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let mut score = self.find(id).await?;
        let was_visible = policy::soft_delete(&mut score);
        score.updated_at = timestamp();

        self.repo.save_score(&score).await?;
        tracing::info!(score_id = %score.id, was_visible, "Deactivated score");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Score, AppError> {
        self.repo
            .get_score(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Score {} not found", id)))
    }
}

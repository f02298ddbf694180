use crate::auth::Actor;
use crate::db::{timestamp, Repository};
use crate::errors::AppError;
use crate::models::{validate_game_name, CreateGameRequest, Game, Role, UpdateGameRequest};
use crate::policy::{self, DetailScope};
use crate::query::{Detail, Filter, Page, QueryPlan, Resource};
use crate::slug::generate_unique_slug;

pub struct GameService<'a> {
    repo: &'a Repository,
}

impl<'a> GameService<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        params: &[(String, String)],
        role: Option<Role>,
    ) -> Result<Page, AppError> {
        let plan = QueryPlan::build(Game::schema(), params, policy::scope_filter(role, None));
        self.repo.query::<Game>(&plan).await
    }

    /// Detail read under the role's scope. Administrators get the filtered
    /// collection rather than a single record.
    pub async fn get(
        &self,
        id: &str,
        params: &[(String, String)],
        role: Option<Role>,
    ) -> Result<Detail, AppError> {
        match policy::detail_scope(role, id) {
            DetailScope::Pinned(filter) => {
                let plan = QueryPlan::build_detail(Game::schema(), params, filter);
                let record = super::single::<Game>(self.repo, &plan, || {
                    AppError::NotFound(format!("Game {} not found", id))
                })
                .await?;
                Ok(Detail::Record(record))
            }
            DetailScope::Unrestricted => {
                let plan = QueryPlan::build(Game::schema(), params, Filter::none());
                Ok(Detail::Collection(self.repo.query::<Game>(&plan).await?))
            }
        }
    }

    pub async fn create(&self, request: CreateGameRequest, actor: &Actor) -> Result<Game, AppError> {
        let name = validate_game_name(request.name.as_deref().unwrap_or_default())?;
        let metadata = request.metadata.unwrap_or_default();
        metadata.validate()?;

        let now = timestamp();
        let game = Game {
            id: uuid::Uuid::new_v4().to_string(),
            slug: generate_unique_slug(&name),
            name,
            description: request.description.unwrap_or_default(),
            metadata,
            is_publish: true,
            created_by: Some(actor.id.clone()),
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_game(&game).await?;
        tracing::info!(game_id = %game.id, slug = %game.slug, created_by = %actor.id, "Created game");
        Ok(game)
    }

    /// Partial update. A changed name gets a fresh slug.
    pub async fn update(&self, id: &str, request: UpdateGameRequest) -> Result<Game, AppError> {
        let mut game = self.find(id).await?;

        if let Some(name) = request.name {
            let name = validate_game_name(&name)?;
            if name != game.name {
                game.slug = generate_unique_slug(&name);
                game.name = name;
            }
        }
        if let Some(description) = request.description {
            game.description = description;
        }
        if let Some(metadata) = request.metadata {
            metadata.validate()?;
            game.metadata = metadata;
        }
        if let Some(is_publish) = request.is_publish {
            game.is_publish = is_publish;
        }
        game.updated_at = timestamp();

        self.repo.save_game(&game).await?;
        tracing::info!(game_id = %game.id, "Updated game");
        Ok(game)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let mut game = self.find(id).await?;
        let was_visible = policy::soft_delete(&mut game);
        game.updated_at = timestamp();

        self.repo.save_game(&game).await?;
        tracing::info!(game_id = %game.id, was_visible, "Deactivated game");
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Game, AppError> {
        self.repo
            .get_game(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {} not found", id)))
    }
}

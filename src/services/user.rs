use serde_json::Value;

use crate::auth::Actor;
use crate::db::{timestamp, Repository};
use crate::errors::AppError;
use crate::models::{validate_username, CreateUserRequest, Role, UpdateUserRequest, User};
use crate::policy;
use crate::query::{Page, QueryPlan, Resource};

pub struct UserService<'a> {
    repo: &'a Repository,
}

impl<'a> UserService<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, params: &[(String, String)], actor: &Actor) -> Result<Page, AppError> {
        actor.require_admin()?;
        let plan = QueryPlan::build(User::schema(), params, policy::scope_filter(Some(actor.role), None));
        self.repo.query::<User>(&plan).await
    }

    pub async fn get(
        &self,
        id: &str,
        params: &[(String, String)],
        actor: &Actor,
    ) -> Result<Value, AppError> {
        actor.require_self_or_admin(id)?;
        let plan = QueryPlan::build_detail(User::schema(), params, policy::pinned(id));
        super::single::<User>(self.repo, &plan, || {
            AppError::NotFound(format!("User {} not found", id))
        })
        .await
    }

    pub async fn create(&self, request: CreateUserRequest, actor: &Actor) -> Result<User, AppError> {
        actor.require_admin()?;
        let username = validate_username(request.username.as_deref().unwrap_or_default())?;

        let now = timestamp();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            role: request.role.unwrap_or(Role::User),
            created_at: now.clone(),
            updated_at: now,
        };

        self.repo.insert_user(&user).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Created user");
        Ok(user)
    }

    /// Partial update of the caller's own account. Role changes need an admin.
    pub async fn update(
        &self,
        id: &str,
        request: UpdateUserRequest,
        actor: &Actor,
    ) -> Result<User, AppError> {
        actor.require_self_or_admin(id)?;
        let mut user = self
            .repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if let Some(username) = request.username {
            user.username = validate_username(&username)?;
        }
        if let Some(role) = request.role {
            if role != user.role {
                actor.require_admin()?;
                user.role = role;
            }
        }
        user.updated_at = timestamp();

        self.repo.save_user(&user).await?;
        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }
}

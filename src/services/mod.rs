//! Resource services.
//!
//! Each service borrows the repository for one request, takes the caller's
//! role or [`Actor`](crate::auth::Actor) explicitly, and owns the validation
//! and policy decisions for its resource.

mod game;
mod score;
mod user;

pub use game::GameService;
pub use score::ScoreService;
pub use user::UserService;

use crate::db::Repository;
use crate::errors::AppError;
use crate::query::{Page, QueryPlan, Resource};

/// Run a pinned detail query and unwrap its single record.
async fn single<R: Resource>(
    repo: &Repository,
    plan: &QueryPlan,
    missing: impl FnOnce() -> AppError,
) -> Result<serde_json::Value, AppError> {
    let page: Page = repo.query::<R>(plan).await?;
    page.data.into_iter().next().ok_or_else(missing)
}

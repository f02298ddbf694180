//! Data models for the leaderboard service.
//!
//! Records serialize with camelCase keys; these keys are also the field names
//! accepted by the list query parameters.

mod game;
mod score;
mod user;

pub use game::*;
pub use score::*;
pub use user::*;

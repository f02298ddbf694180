//! Game catalog model.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Maximum length of a game name, in characters.
pub const MAX_GAME_NAME_LEN: usize = 128;

/// Gameplay settings attached to a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    #[serde(default)]
    pub modes: Vec<String>,
    #[serde(default = "default_max_players")]
    pub max_players: i64,
    #[serde(default)]
    pub time_limit_sec: i64,
    #[serde(default)]
    pub icon_url: String,
}

fn default_max_players() -> i64 {
    1
}

impl Default for GameMetadata {
    fn default() -> Self {
        Self {
            modes: Vec::new(),
            max_players: default_max_players(),
            time_limit_sec: 0,
            icon_url: String::new(),
        }
    }
}

impl GameMetadata {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_players < 1 {
            return Err(AppError::Validation(
                "maxPlayers must be a positive integer".to_string(),
            ));
        }
        if self.time_limit_sec < 0 {
            return Err(AppError::Validation(
                "timeLimitSec must be a non-negative integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub metadata: GameMetadata,
    /// Visibility flag; `false` once the game has been removed
    pub is_publish: bool,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new game.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<GameMetadata>,
}

/// Request body for updating an existing game.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<GameMetadata>,
    #[serde(default)]
    pub is_publish: Option<bool>,
}

/// Trim and check a game name.
pub fn validate_game_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Game name is required".to_string()));
    }
    if name.chars().count() > MAX_GAME_NAME_LEN {
        return Err(AppError::Validation("Game name is too long".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_defaults() {
        let metadata: GameMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata, GameMetadata::default());
        assert_eq!(metadata.max_players, 1);
        assert_eq!(metadata.time_limit_sec, 0);
    }

    #[test]
    fn test_metadata_bounds() {
        let mut metadata = GameMetadata::default();
        assert!(metadata.validate().is_ok());
        metadata.max_players = 0;
        assert!(metadata.validate().is_err());
        metadata.max_players = 4;
        metadata.time_limit_sec = -1;
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_validate_game_name() {
        assert_eq!(validate_game_name("  Space Race ").unwrap(), "Space Race");
        assert!(validate_game_name("   ").is_err());
        assert!(validate_game_name(&"x".repeat(MAX_GAME_NAME_LEN)).is_ok());
        assert!(validate_game_name(&"x".repeat(MAX_GAME_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_game_serializes_camel_case() {
        let game = Game {
            id: "g1".into(),
            name: "Space Race".into(),
            slug: "space-race-ab12".into(),
            description: String::new(),
            metadata: GameMetadata::default(),
            is_publish: true,
            created_by: None,
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["isPublish"], true);
        assert_eq!(json["metadata"]["maxPlayers"], 1);
        assert!(json["createdBy"].is_null());
    }
}

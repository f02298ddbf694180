//! Score model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Maximum number of top-level keys in score metadata.
pub const MAX_METADATA_KEYS: usize = 32;
/// Maximum nesting depth of score metadata (the top-level object is depth 1).
pub const MAX_METADATA_DEPTH: usize = 4;
/// Maximum serialized size of score metadata, in bytes.
pub const MAX_METADATA_BYTES: usize = 4096;

/// A score submitted by a user for a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub id: String,
    pub user: String,
    pub game: String,
    pub value: f64,
    pub metadata: Map<String, Value>,
    /// Soft-delete flag; `false` once the score has been removed
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for submitting a score. The owner comes from the session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScoreRequest {
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Request body for updating an existing score.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreRequest {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, alias = "isPublish")]
    pub is_active: Option<bool>,
}

/// Check the size bounds of a free-form metadata map.
pub fn validate_metadata(metadata: &Map<String, Value>) -> Result<(), AppError> {
    if metadata.len() > MAX_METADATA_KEYS {
        return Err(AppError::Validation(format!(
            "Metadata may have at most {} keys",
            MAX_METADATA_KEYS
        )));
    }
    let depth = metadata.values().map(value_depth).max().unwrap_or(0) + 1;
    if depth > MAX_METADATA_DEPTH {
        return Err(AppError::Validation(format!(
            "Metadata may be nested at most {} levels deep",
            MAX_METADATA_DEPTH
        )));
    }
    let size = serde_json::to_vec(metadata)?.len();
    if size > MAX_METADATA_BYTES {
        return Err(AppError::Validation(format!(
            "Metadata may not exceed {} bytes",
            MAX_METADATA_BYTES
        )));
    }
    Ok(())
}

fn value_depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(value_depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(value_depth).max().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_metadata_within_bounds() {
        assert!(validate_metadata(&Map::new()).is_ok());
        assert!(validate_metadata(&map(json!({ "level": 3, "run": { "lap": [1, 2] } }))).is_ok());
    }

    #[test]
    fn test_metadata_too_deep() {
        let deep = json!({ "a": { "b": { "c": { "d": { "e": 1 } } } } });
        assert!(validate_metadata(&map(json!({ "a": { "b": { "c": { "d": 1 } } } }))).is_ok());
        assert!(validate_metadata(&map(deep)).is_err());
    }

    #[test]
    fn test_metadata_too_many_keys() {
        let wide: Map<String, Value> = (0..=MAX_METADATA_KEYS)
            .map(|i| (format!("k{i}"), json!(i)))
            .collect();
        assert!(validate_metadata(&wide).is_err());
    }

    #[test]
    fn test_metadata_too_large() {
        let big = json!({ "blob": "x".repeat(MAX_METADATA_BYTES) });
        assert!(validate_metadata(&map(big)).is_err());
    }

    #[test]
    fn test_update_accepts_is_publish_alias() {
        let request: UpdateScoreRequest = serde_json::from_str(r#"{"isPublish": false}"#).unwrap();
        assert_eq!(request.is_active, Some(false));
        let request: UpdateScoreRequest = serde_json::from_str(r#"{"isActive": true}"#).unwrap();
        assert_eq!(request.is_active, Some(true));
    }
}

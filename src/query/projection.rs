//! Projection stage: `fields=name,slug` keeps only the listed keys.

use serde_json::{Map, Value};

use super::schema::ResourceSchema;

/// Allow-list of serialized keys; `None` keeps every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Option<Vec<&'static str>>,
}

impl Projection {
    /// Parse the projection parameter. `id` is always kept; unknown names are
    /// ignored, and a list with no known names selects everything.
    pub fn build(schema: &'static ResourceSchema, param: Option<&str>) -> Self {
        let Some(spec) = param else {
            return Self { fields: None };
        };

        let mut fields: Vec<&'static str> = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            match schema.field(name) {
                Some(field) if !fields.contains(&field.name) => fields.push(field.name),
                Some(_) => {}
                None => {
                    tracing::debug!(field = name, table = schema.table, "Ignoring projection of unknown field")
                }
            }
        }

        if fields.is_empty() {
            return Self { fields: None };
        }
        if !fields.contains(&"id") {
            fields.insert(0, "id");
        }
        Self {
            fields: Some(fields),
        }
    }

    pub fn includes(&self, name: &str) -> bool {
        match &self.fields {
            Some(fields) => fields.contains(&name),
            None => true,
        }
    }

    pub fn apply(&self, record: &mut Map<String, Value>) {
        if self.fields.is_some() {
            record.retain(|key, _| self.includes(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{GAME_SCHEMA, SCORE_SCHEMA};
    use serde_json::json;

    fn record() -> Map<String, Value> {
        json!({
            "id": "s1",
            "user": "u1",
            "game": "g1",
            "value": 10.0,
            "metadata": {},
            "isActive": true
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_absent_keeps_everything() {
        let projection = Projection::build(&SCORE_SCHEMA, None);
        let mut rec = record();
        projection.apply(&mut rec);
        assert_eq!(rec.len(), 6);
    }

    #[test]
    fn test_allow_list_keeps_id() {
        let projection = Projection::build(&SCORE_SCHEMA, Some("value, game"));
        let mut rec = record();
        projection.apply(&mut rec);
        let keys: Vec<&str> = rec.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(rec.contains_key("id"));
        assert!(rec.contains_key("value"));
        assert!(rec.contains_key("game"));
    }

    #[test]
    fn test_alias_projects_canonical_key() {
        let projection = Projection::build(&SCORE_SCHEMA, Some("isPublish"));
        assert!(projection.includes("isActive"));
        assert!(!projection.includes("value"));
    }

    #[test]
    fn test_unknown_only_means_everything() {
        let projection = Projection::build(&GAME_SCHEMA, Some("bogus,,"));
        assert!(projection.includes("slug"));
        assert!(projection.includes("metadata"));
    }
}

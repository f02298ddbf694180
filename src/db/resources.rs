//! Query schemas and row mapping for each stored resource.

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::models::{Game, GameMetadata, Role, Score, User};
use crate::query::{Field, FieldKind, Relation, Resource, ResourceSchema};

const USER_SUMMARY: &[Field] = &[Field::new("username", "username", FieldKind::Text)];
const GAME_SUMMARY: &[Field] = &[Field::new("name", "name", FieldKind::Text)];

const GAME_FIELDS: &[Field] = &[
    Field::new("id", "id", FieldKind::Text),
    Field::new("name", "name", FieldKind::Text),
    Field::new("slug", "slug", FieldKind::Text),
    Field::new("description", "description", FieldKind::Text),
    Field::new("metadata", "metadata", FieldKind::Json),
    Field::new("isPublish", "is_publish", FieldKind::Bool),
    Field::new("createdBy", "created_by", FieldKind::Text),
    Field::new("createdAt", "created_at", FieldKind::Text),
    Field::new("updatedAt", "updated_at", FieldKind::Text),
];

const SCORE_FIELDS: &[Field] = &[
    Field::new("id", "id", FieldKind::Text),
    Field::new("user", "user_id", FieldKind::Text),
    Field::new("game", "game_id", FieldKind::Text),
    Field::new("value", "value", FieldKind::Real),
    Field::new("metadata", "metadata", FieldKind::Json),
    Field::new("isActive", "is_active", FieldKind::Bool).with_aliases(&["isPublish"]),
    Field::new("createdAt", "created_at", FieldKind::Text),
    Field::new("updatedAt", "updated_at", FieldKind::Text),
];

const USER_FIELDS: &[Field] = &[
    Field::new("id", "id", FieldKind::Text),
    Field::new("username", "username", FieldKind::Text),
    Field::new("role", "role", FieldKind::Text),
    Field::new("createdAt", "created_at", FieldKind::Text),
    Field::new("updatedAt", "updated_at", FieldKind::Text),
];

const GAME_RELATIONS: &[Relation] = &[Relation {
    field: "createdBy",
    table: "users",
    fields: USER_SUMMARY,
}];

const SCORE_RELATIONS: &[Relation] = &[
    Relation {
        field: "user",
        table: "users",
        fields: USER_SUMMARY,
    },
    Relation {
        field: "game",
        table: "games",
        fields: GAME_SUMMARY,
    },
];

pub const GAME_COLUMNS: &str =
    "id, name, slug, description, metadata, is_publish, created_by, created_at, updated_at";
pub const SCORE_COLUMNS: &str =
    "id, user_id, game_id, value, metadata, is_active, created_at, updated_at";
pub const USER_COLUMNS: &str = "id, username, role, created_at, updated_at";

pub static GAME_SCHEMA: ResourceSchema = ResourceSchema {
    table: "games",
    columns: GAME_COLUMNS,
    fields: GAME_FIELDS,
    default_sort: "-createdAt",
    default_limit: 10,
    relations: GAME_RELATIONS,
    default_populate: &[],
};

pub static SCORE_SCHEMA: ResourceSchema = ResourceSchema {
    table: "scores",
    columns: SCORE_COLUMNS,
    fields: SCORE_FIELDS,
    default_sort: "-value",
    default_limit: 10,
    relations: SCORE_RELATIONS,
    default_populate: &["user", "game"],
};

pub static USER_SCHEMA: ResourceSchema = ResourceSchema {
    table: "users",
    columns: USER_COLUMNS,
    fields: USER_FIELDS,
    default_sort: "-createdAt",
    default_limit: 10,
    relations: &[],
    default_populate: &[],
};

impl Resource for Game {
    fn schema() -> &'static ResourceSchema {
        &GAME_SCHEMA
    }

    fn from_row(row: &SqliteRow) -> Self {
        game_from_row(row)
    }
}

impl Resource for Score {
    fn schema() -> &'static ResourceSchema {
        &SCORE_SCHEMA
    }

    fn from_row(row: &SqliteRow) -> Self {
        score_from_row(row)
    }
}

impl Resource for User {
    fn schema() -> &'static ResourceSchema {
        &USER_SCHEMA
    }

    fn from_row(row: &SqliteRow) -> Self {
        user_from_row(row)
    }
}

// Helper functions for row conversion

pub(crate) fn game_from_row(row: &SqliteRow) -> Game {
    let is_publish: i64 = row.get("is_publish");
    let metadata: String = row.get("metadata");
    Game {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        metadata: serde_json::from_str::<GameMetadata>(&metadata).unwrap_or_default(),
        is_publish: is_publish != 0,
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub(crate) fn score_from_row(row: &SqliteRow) -> Score {
    let is_active: i64 = row.get("is_active");
    let metadata: String = row.get("metadata");
    Score {
        id: row.get("id"),
        user: row.get("user_id"),
        game: row.get("game_id"),
        value: row.get("value"),
        metadata: serde_json::from_str::<Map<String, Value>>(&metadata).unwrap_or_default(),
        is_active: is_active != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub(crate) fn user_from_row(row: &SqliteRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        username: row.get("username"),
        role: Role::from_str(&role).unwrap_or(Role::User),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_column_has_a_field() {
        for schema in [&GAME_SCHEMA, &SCORE_SCHEMA, &USER_SCHEMA] {
            for column in schema.columns.split(", ") {
                assert!(
                    schema.fields.iter().any(|f| f.column == column),
                    "{}.{} has no field",
                    schema.table,
                    column
                );
            }
        }
    }

    #[test]
    fn test_default_sorts_resolve() {
        for schema in [&GAME_SCHEMA, &SCORE_SCHEMA, &USER_SCHEMA] {
            let name = schema.default_sort.trim_start_matches('-');
            assert!(schema.field(name).is_some());
        }
    }

    #[test]
    fn test_default_populate_resolves() {
        for name in SCORE_SCHEMA.default_populate {
            assert!(SCORE_SCHEMA.relation(name).is_some());
        }
    }
}

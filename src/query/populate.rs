//! Relation expansion: swap reference ids for small sub-documents.
//!
//! Runs after the page has been fetched, so it never changes which records
//! match or how they are ordered.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::projection::Projection;
use super::schema::{FieldKind, Relation, ResourceSchema};

#[derive(Debug, Clone)]
pub struct Populate {
    relations: Vec<&'static Relation>,
}

impl Populate {
    /// `populate=user,game` picks relations by field name; without the
    /// parameter the resource defaults apply. Relations whose field is not
    /// part of the projection are skipped.
    pub fn build(
        schema: &'static ResourceSchema,
        param: Option<&str>,
        projection: &Projection,
    ) -> Self {
        let names: Vec<&str> = match param {
            Some(spec) => spec
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
            None => schema.default_populate.to_vec(),
        };

        let mut relations: Vec<&'static Relation> = Vec::new();
        for name in names {
            match schema.relation(name) {
                Some(relation)
                    if projection.includes(relation.field)
                        && !relations.iter().any(|r| r.field == relation.field) =>
                {
                    relations.push(relation)
                }
                Some(_) => {}
                None => {
                    tracing::debug!(relation = name, table = schema.table, "Ignoring unknown relation")
                }
            }
        }
        Self { relations }
    }

    pub fn relations(&self) -> &[&'static Relation] {
        &self.relations
    }
}

/// Distinct ids referenced by `relation` across the records.
pub fn referenced_ids(relation: &Relation, records: &[Map<String, Value>]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.get(relation.field).and_then(Value::as_str))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `SELECT id, <fields> FROM <table> WHERE id IN (...)` for the given ids.
pub fn lookup_query(relation: &Relation, ids: &[String]) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT id");
    for field in relation.fields {
        qb.push(", ").push(field.column);
    }
    qb.push(" FROM ").push(relation.table).push(" WHERE id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
    qb
}

/// Turn a lookup row into the `{id, ...fields}` sub-document.
pub fn sub_document(relation: &Relation, row: &SqliteRow) -> (String, Value) {
    let id: String = row.get("id");
    let mut doc = Map::new();
    doc.insert("id".to_string(), Value::String(id.clone()));
    for field in relation.fields {
        let value = match field.kind {
            FieldKind::Integer => Value::from(row.get::<i64, _>(field.column)),
            FieldKind::Real => Value::from(row.get::<f64, _>(field.column)),
            FieldKind::Bool => Value::from(row.get::<i64, _>(field.column) != 0),
            FieldKind::Text | FieldKind::Json => {
                Value::from(row.get::<Option<String>, _>(field.column))
            }
        };
        doc.insert(field.name.to_string(), value);
    }
    (id, Value::Object(doc))
}

/// Replace each reference id with its sub-document, or `null` when the
/// referenced record no longer exists.
pub fn attach(relation: &Relation, records: &mut [Map<String, Value>], resolved: &HashMap<String, Value>) {
    for record in records.iter_mut() {
        let Some(slot) = record.get_mut(relation.field) else {
            continue;
        };
        let replacement = match slot.as_str() {
            Some(id) => resolved.get(id).cloned().unwrap_or(Value::Null),
            None => continue,
        };
        *slot = replacement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{GAME_SCHEMA, SCORE_SCHEMA};
    use serde_json::json;

    fn fields(populate: &Populate) -> Vec<&'static str> {
        populate.relations().iter().map(|r| r.field).collect()
    }

    #[test]
    fn test_defaults() {
        let all = Projection::build(&SCORE_SCHEMA, None);
        assert_eq!(fields(&Populate::build(&SCORE_SCHEMA, None, &all)), vec!["user", "game"]);

        let all = Projection::build(&GAME_SCHEMA, None);
        assert!(Populate::build(&GAME_SCHEMA, None, &all).relations().is_empty());
        assert_eq!(
            fields(&Populate::build(&GAME_SCHEMA, Some("createdBy"), &all)),
            vec!["createdBy"]
        );
    }

    #[test]
    fn test_explicit_selection_and_projection() {
        let all = Projection::build(&SCORE_SCHEMA, None);
        assert_eq!(
            fields(&Populate::build(&SCORE_SCHEMA, Some("game,bogus,game"), &all)),
            vec!["game"]
        );

        let value_only = Projection::build(&SCORE_SCHEMA, Some("value"));
        assert!(Populate::build(&SCORE_SCHEMA, None, &value_only)
            .relations()
            .is_empty());
    }

    #[test]
    fn test_lookup_query_sql() {
        let relation = SCORE_SCHEMA.relation("user").unwrap();
        let qb = lookup_query(relation, &["a".to_string(), "b".to_string()]);
        assert_eq!(
            qb.sql(),
            "SELECT id, username FROM users WHERE id IN (?, ?)"
        );
    }

    #[test]
    fn test_referenced_ids_and_attach() {
        let relation = SCORE_SCHEMA.relation("game").unwrap();
        let mut records: Vec<Map<String, Value>> = vec![
            json!({ "id": "s1", "game": "g1" }),
            json!({ "id": "s2", "game": "g2" }),
            json!({ "id": "s3", "game": "g1" }),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        assert_eq!(referenced_ids(relation, &records), vec!["g1", "g2"]);

        let resolved: HashMap<String, Value> =
            [("g1".to_string(), json!({ "id": "g1", "name": "Space Race" }))].into();
        attach(relation, &mut records, &resolved);

        assert_eq!(records[0]["game"]["name"], "Space Race");
        assert!(records[1]["game"].is_null());
        assert_eq!(records[2]["game"]["id"], "g1");
    }
}

//! Filter stage: query-string parameters to a WHERE clause.
//!
//! `field=value` is an equality test, `field[op]=value` applies one of the
//! operators below. Unknown fields and operators are dropped; values that do
//! not parse as the field's type produce a condition that matches nothing.

use std::collections::HashSet;

use sqlx::{QueryBuilder, Sqlite};

use super::schema::{FieldKind, ResourceSchema};
use super::RESERVED_PARAMS;

/// Comparison operator accepted in `field[op]` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Op {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Op::Eq),
            "ne" => Some(Op::Ne),
            "gt" => Some(Op::Gt),
            "gte" => Some(Op::Gte),
            "lt" => Some(Op::Lt),
            "lte" => Some(Op::Lte),
            "in" => Some(Op::In),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Op::Eq => " = ",
            Op::Ne => " != ",
            Op::Gt => " > ",
            Op::Gte => " >= ",
            Op::Lt => " < ",
            Op::Lte => " <= ",
            Op::In => " IN ",
        }
    }
}

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl SqlValue {
    /// Parse a raw query-string value as the given column type.
    pub fn coerce(kind: FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Text => Some(SqlValue::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse().ok().map(SqlValue::Integer),
            FieldKind::Real => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(SqlValue::Real),
            FieldKind::Bool => match raw.trim() {
                "true" | "1" => Some(SqlValue::Integer(1)),
                "false" | "0" => Some(SqlValue::Integer(0)),
                _ => None,
            },
            FieldKind::Json => None,
        }
    }

    fn push_bind(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            SqlValue::Text(v) => qb.push_bind(v.clone()),
            SqlValue::Integer(v) => qb.push_bind(*v),
            SqlValue::Real(v) => qb.push_bind(*v),
        };
    }
}

/// One predicate of the WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: &'static str,
        op: Op,
        value: SqlValue,
    },
    AnyOf {
        column: &'static str,
        values: Vec<SqlValue>,
    },
    /// Matches no row
    Never,
}

impl Condition {
    fn column(&self) -> Option<&'static str> {
        match self {
            Condition::Compare { column, .. } | Condition::AnyOf { column, .. } => Some(*column),
            Condition::Never => None,
        }
    }
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter that restricts nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Restrict to a single record id.
    pub fn id_equals(id: &str) -> Self {
        Self {
            conditions: vec![Condition::Compare {
                column: "id",
                op: Op::Eq,
                value: SqlValue::Text(id.to_string()),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Combine the access-control filter with the caller's parameters.
    ///
    /// Parameters naming a column already constrained by `manual` are discarded.
    pub fn build(schema: &'static ResourceSchema, params: &[(String, String)], manual: Filter) -> Self {
        let locked: HashSet<&'static str> =
            manual.conditions.iter().filter_map(Condition::column).collect();
        let mut conditions = manual.conditions;

        for (key, raw) in params {
            if RESERVED_PARAMS.contains(&key.as_str()) {
                continue;
            }
            let Some((name, op)) = split_key(key) else {
                tracing::debug!(param = %key, "Ignoring filter with unknown operator");
                continue;
            };
            let Some(field) = schema.field(name) else {
                tracing::debug!(param = %key, table = schema.table, "Ignoring filter on unknown field");
                continue;
            };
            if field.kind == FieldKind::Json {
                continue;
            }
            if locked.contains(field.column) {
                tracing::debug!(param = %key, "Ignoring filter overridden by access scope");
                continue;
            }
            conditions.push(condition_for(field.column, field.kind, op, raw));
        }

        Self { conditions }
    }

    /// Append ` WHERE ...` to the builder.
    pub fn push_where(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        for condition in &self.conditions {
            match condition {
                Condition::Compare { column, op, value } => {
                    qb.push(" AND ").push(*column).push(op.sql());
                    value.push_bind(qb);
                }
                Condition::AnyOf { column, values } => {
                    qb.push(" AND ").push(*column).push(" IN (");
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            qb.push(", ");
                        }
                        value.push_bind(qb);
                    }
                    qb.push(")");
                }
                Condition::Never => {
                    qb.push(" AND 0 = 1");
                }
            }
        }
    }
}

/// Split `name[op]` into its parts; a bare `name` means equality.
fn split_key(key: &str) -> Option<(&str, Op)> {
    match key.split_once('[') {
        None => Some((key, Op::Eq)),
        Some((name, rest)) => {
            let op = rest.strip_suffix(']')?;
            Op::from_str(op).map(|op| (name, op))
        }
    }
}

fn condition_for(column: &'static str, kind: FieldKind, op: Op, raw: &str) -> Condition {
    if op == Op::In {
        let values: Vec<SqlValue> = raw
            .split(',')
            .filter_map(|item| SqlValue::coerce(kind, item))
            .collect();
        if values.is_empty() {
            return Condition::Never;
        }
        return Condition::AnyOf { column, values };
    }
    match SqlValue::coerce(kind, raw) {
        Some(value) => Condition::Compare { column, op, value },
        None => Condition::Never,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{GAME_SCHEMA, SCORE_SCHEMA};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sql(filter: &Filter) -> String {
        let mut qb = QueryBuilder::new("SELECT * FROM t");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_equality_and_operators() {
        let filter = Filter::build(
            &SCORE_SCHEMA,
            &params(&[("game", "g1"), ("value[gte]", "50"), ("value[lt]", "100")]),
            Filter::none(),
        );
        assert_eq!(
            filter.conditions(),
            &[
                Condition::Compare {
                    column: "game_id",
                    op: Op::Eq,
                    value: SqlValue::Text("g1".into())
                },
                Condition::Compare {
                    column: "value",
                    op: Op::Gte,
                    value: SqlValue::Real(50.0)
                },
                Condition::Compare {
                    column: "value",
                    op: Op::Lt,
                    value: SqlValue::Real(100.0)
                },
            ]
        );
        assert_eq!(
            sql(&filter),
            "SELECT * FROM t WHERE 1 = 1 AND game_id = ? AND value >= ? AND value < ?"
        );
    }

    #[test]
    fn test_reserved_and_unknown_params_are_dropped() {
        let filter = Filter::build(
            &GAME_SCHEMA,
            &params(&[
                ("sort", "-name"),
                ("page", "2"),
                ("limit", "5"),
                ("fields", "name"),
                ("populate", "createdBy"),
                ("nonexistent", "x"),
                ("name[regex]", "x"),
                ("metadata", "{}"),
            ]),
            Filter::none(),
        );
        assert!(filter.is_empty());
        assert_eq!(sql(&filter), "SELECT * FROM t WHERE 1 = 1");
    }

    #[test]
    fn test_bool_coercion() {
        let filter = Filter::build(&GAME_SCHEMA, &params(&[("isPublish", "false")]), Filter::none());
        assert_eq!(
            filter.conditions(),
            &[Condition::Compare {
                column: "is_publish",
                op: Op::Eq,
                value: SqlValue::Integer(0)
            }]
        );
    }

    #[test]
    fn test_alias_resolves_to_column() {
        let filter = Filter::build(&SCORE_SCHEMA, &params(&[("isPublish", "true")]), Filter::none());
        assert_eq!(
            filter.conditions(),
            &[Condition::Compare {
                column: "is_active",
                op: Op::Eq,
                value: SqlValue::Integer(1)
            }]
        );
    }

    #[test]
    fn test_unparsable_value_matches_nothing() {
        let filter = Filter::build(&SCORE_SCHEMA, &params(&[("value", "lots")]), Filter::none());
        assert_eq!(filter.conditions(), &[Condition::Never]);
        assert!(sql(&filter).ends_with("AND 0 = 1"));
    }

    #[test]
    fn test_in_operator() {
        let filter = Filter::build(&SCORE_SCHEMA, &params(&[("value[in]", "1,2,x")]), Filter::none());
        assert_eq!(
            filter.conditions(),
            &[Condition::AnyOf {
                column: "value",
                values: vec![SqlValue::Real(1.0), SqlValue::Real(2.0)]
            }]
        );
        assert!(sql(&filter).ends_with("AND value IN (?, ?)"));
    }

    #[test]
    fn test_manual_filter_takes_precedence() {
        let filter = Filter::build(
            &GAME_SCHEMA,
            &params(&[("id", "other"), ("id[ne]", "x"), ("name", "Space Race")]),
            Filter::id_equals("pinned"),
        );
        assert_eq!(
            filter.conditions(),
            &[
                Condition::Compare {
                    column: "id",
                    op: Op::Eq,
                    value: SqlValue::Text("pinned".into())
                },
                Condition::Compare {
                    column: "name",
                    op: Op::Eq,
                    value: SqlValue::Text("Space Race".into())
                },
            ]
        );
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("value"), Some(("value", Op::Eq)));
        assert_eq!(split_key("value[lte]"), Some(("value", Op::Lte)));
        assert_eq!(split_key("value[lte"), None);
        assert_eq!(split_key("value[like]"), None);
    }
}

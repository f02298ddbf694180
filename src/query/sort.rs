//! Sort stage: `sort=-value,createdAt` to an ORDER BY clause.

use sqlx::{QueryBuilder, Sqlite};

use super::schema::{FieldKind, ResourceSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub descending: bool,
}

/// Ordered list of sort keys, always ending with `id` so pages are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    keys: Vec<SortKey>,
}

impl Sort {
    /// Parse the `sort` parameter, falling back to the resource default when it
    /// is absent or names no sortable field.
    pub fn build(schema: &'static ResourceSchema, param: Option<&str>) -> Self {
        let mut keys = param.map(|spec| parse(schema, spec)).unwrap_or_default();
        if keys.is_empty() {
            keys = parse(schema, schema.default_sort);
        }
        if !keys.iter().any(|key| key.column == "id") {
            keys.push(SortKey {
                column: "id",
                descending: false,
            });
        }
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Append ` ORDER BY ...` to the builder.
    pub fn push_order_by(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        qb.push(" ORDER BY ");
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(key.column)
                .push(if key.descending { " DESC" } else { " ASC" });
        }
    }
}

fn parse(schema: &'static ResourceSchema, spec: &str) -> Vec<SortKey> {
    let mut keys: Vec<SortKey> = Vec::new();
    for item in spec.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let (name, descending) = match item.strip_prefix('-') {
            Some(name) => (name, true),
            None => (item.strip_prefix('+').unwrap_or(item), false),
        };
        let Some(field) = schema.field(name) else {
            tracing::debug!(field = name, table = schema.table, "Ignoring sort on unknown field");
            continue;
        };
        if field.kind == FieldKind::Json || keys.iter().any(|key| key.column == field.column) {
            continue;
        }
        keys.push(SortKey {
            column: field.column,
            descending,
        });
    }
    keys
}

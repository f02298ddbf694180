//! Static description of a queryable resource.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;

/// Storage type of a column, used to coerce query-string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Real,
    /// Stored as 0/1
    Bool,
    /// JSON document stored as text; never filtered or sorted on
    Json,
}

/// A field exposed through the API, mapped onto its column.
#[derive(Debug)]
pub struct Field {
    /// camelCase name used in query parameters and serialized records
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    /// Alternative parameter names accepted for this field
    pub aliases: &'static [&'static str],
}

impl Field {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            aliases: &[],
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

/// A reference field that can be expanded into a sub-document.
#[derive(Debug)]
pub struct Relation {
    /// Field on the owning record holding the referenced id
    pub field: &'static str,
    /// Table the id points into
    pub table: &'static str,
    /// Fields of the referenced record copied next to its id
    pub fields: &'static [Field],
}

/// Everything the query pipeline needs to know about one resource type.
#[derive(Debug)]
pub struct ResourceSchema {
    pub table: &'static str,
    /// Column list for SELECT statements
    pub columns: &'static str,
    pub fields: &'static [Field],
    /// Sort specification used when the request gives none
    pub default_sort: &'static str,
    pub default_limit: u32,
    pub relations: &'static [Relation],
    /// Relations expanded when the request does not name any
    pub default_populate: &'static [&'static str],
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        let fields: &'static [Field] = self.fields;
        fields.iter().find(|field| field.answers_to(name))
    }

    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        let relations: &'static [Relation] = self.relations;
        relations.iter().find(|relation| relation.field == name)
    }
}

/// A record type the pipeline can fetch.
pub trait Resource: Serialize {
    fn schema() -> &'static ResourceSchema;
    fn from_row(row: &SqliteRow) -> Self;
}

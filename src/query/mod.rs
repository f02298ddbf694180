//! Generic list query pipeline.
//!
//! Request parameters go through five independent stages, in this order:
//! filter, sort, projection, pagination and relation expansion. Each stage is
//! a plain value built from the parameters; [`QueryPlan`] holds all of them and
//! renders the SQL that the repository executes.
//!
//! The pipeline performs no authorization. Access restrictions arrive as the
//! `manual` filter, which caller parameters can never override.

pub mod filter;
pub mod pagination;
pub mod populate;
pub mod projection;
pub mod schema;
pub mod sort;

pub use filter::Filter;
pub use pagination::Pagination;
pub use populate::Populate;
pub use projection::Projection;
pub use schema::{Field, FieldKind, Relation, Resource, ResourceSchema};
pub use sort::Sort;

use serde::Serialize;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite};

/// Parameter names consumed by stages other than the filter.
pub const RESERVED_PARAMS: &[&str] = &["sort", "fields", "limitFields", "page", "limit", "populate"];

/// Last value of a query parameter.
fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Every stage of one list query.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub schema: &'static ResourceSchema,
    pub filter: Filter,
    pub sort: Sort,
    pub projection: Projection,
    pub pagination: Pagination,
    pub populate: Populate,
}

impl QueryPlan {
    pub fn build(schema: &'static ResourceSchema, params: &[(String, String)], manual: Filter) -> Self {
        let filter = Filter::build(schema, params, manual);
        let sort = Sort::build(schema, param(params, "sort"));
        let projection = Projection::build(
            schema,
            param(params, "fields").or_else(|| param(params, "limitFields")),
        );
        let pagination = Pagination::build(
            schema.default_limit,
            param(params, "page"),
            param(params, "limit"),
        );
        let populate = Populate::build(schema, param(params, "populate"), &projection);

        Self {
            schema,
            filter,
            sort,
            projection,
            pagination,
            populate,
        }
    }

    /// Plan for a read pinned to one record. The caller's `page` and `limit`
    /// are ignored so the window always holds the match.
    pub fn build_detail(
        schema: &'static ResourceSchema,
        params: &[(String, String)],
        manual: Filter,
    ) -> Self {
        let mut plan = Self::build(schema, params, manual);
        plan.pagination = Pagination::first_record();
        plan
    }

    /// `SELECT COUNT(*)` over the filtered set, ignoring the window.
    pub fn count_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) AS count FROM ");
        qb.push(self.schema.table);
        self.filter.push_where(&mut qb);
        qb
    }

    /// Filtered, sorted and windowed row select.
    pub fn select_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.schema.columns)
            .push(" FROM ")
            .push(self.schema.table);
        self.filter.push_where(&mut qb);
        self.sort.push_order_by(&mut qb);
        self.pagination.push_window(&mut qb);
        qb
    }
}

/// One page of results, ready to wrap in the list envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub data: Vec<Value>,
}

impl Page {
    pub fn new(pagination: &Pagination, count: i64, data: Vec<Value>) -> Self {
        Self {
            count,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: pagination.total_pages(count),
            data,
        }
    }
}

/// Outcome of a detail read.
#[derive(Debug, Clone)]
pub enum Detail {
    /// The scope pinned one record
    Record(Value),
    /// The scope was unrestricted; the whole filtered collection
    Collection(Page),
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

    #[test]
    fn test_param_last_value_wins() {
        let p = params(&[("page", "1"), ("page", "3")]);
        assert_eq!(param(&p, "page"), Some("3"));
        assert_eq!(param(&p, "limit"), None);
    }

    #[test]
    fn test_select_query_stage_order() {
        let plan = QueryPlan::build(
            &SCORE_SCHEMA,
            &params(&[("game", "g1"), ("page", "2"), ("limit", "10")]),
            Filter::none(),
        );
        let qb = plan.select_query();
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT id, user_id, game_id"));
        assert!(sql.ends_with(
            "FROM scores WHERE 1 = 1 AND game_id = ? ORDER BY value DESC, id ASC LIMIT ? OFFSET ?"
        ));
        assert_eq!(plan.pagination.skip(), 10);
    }

    #[test]
    fn test_count_query_ignores_window_and_sort() {
        let plan = QueryPlan::build(
            &GAME_SCHEMA,
            &params(&[("isPublish", "true"), ("sort", "name"), ("page", "4")]),
            Filter::id_equals("g1"),
        );
        assert_eq!(
            plan.count_query().sql(),
            "SELECT COUNT(*) AS count FROM games WHERE 1 = 1 AND id = ? AND is_publish = ?"
        );
    }

    #[test]
    fn test_detail_window_ignores_page_and_limit() {
        let plan = QueryPlan::build_detail(
            &GAME_SCHEMA,
            &params(&[("page", "3"), ("limit", "50"), ("fields", "name")]),
            Filter::id_equals("g1"),
        );
        assert_eq!(plan.pagination.page, 1);
        assert_eq!(plan.pagination.limit, 1);
        assert_eq!(plan.pagination.skip(), 0);
        assert!(!plan.projection.includes("slug"));
    }

    #[test]
    fn test_limit_fields_alias() {
        let plan = QueryPlan::build(&GAME_SCHEMA, &params(&[("limitFields", "name")]), Filter::none());
        assert!(plan.projection.includes("name"));
        assert!(!plan.projection.includes("slug"));
    }

    #[test]
    fn test_page_envelope() {
        let pagination = Pagination::build(10, Some("2"), Some("10"));
        let page = Page::new(&pagination, 15, vec![Value::Null; 5]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["count"], 15);
        assert_eq!(json["page"], 2);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 5);
    }
}

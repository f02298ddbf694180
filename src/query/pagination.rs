//! Pagination stage: `page` and `limit` to a LIMIT/OFFSET window.
//!
//! Integer values below 1 clamp to 1 and `limit` clamps to [`MAX_LIMIT`];
//! anything that is not an integer falls back to the default.

use sqlx::{QueryBuilder, Sqlite};

pub const DEFAULT_PAGE: u32 = 1;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn build(default_limit: u32, page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_bound(page, DEFAULT_PAGE, u32::MAX),
            limit: parse_bound(limit, default_limit.clamp(1, MAX_LIMIT), MAX_LIMIT),
        }
    }

    /// Window holding only the first record.
    pub fn first_record() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: 1,
        }
    }

    /// Number of records before the window.
    pub fn skip(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn total_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (count + limit - 1) / limit
    }

    /// Append ` LIMIT ? OFFSET ?` to the builder.
    pub fn push_window(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        qb.push(" LIMIT ")
            .push_bind(i64::from(self.limit))
            .push(" OFFSET ")
            .push_bind(self.skip());
    }
}

fn parse_bound(raw: Option<&str>, default: u32, max: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => n.min(i64::from(max)) as u32,
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination::build(10, None, None);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
        assert_eq!(p.skip(), 0);
    }

    #[test]
    fn test_window() {
        let p = Pagination::build(10, Some("2"), Some("10"));
        assert_eq!(p.skip(), 10);
        assert_eq!(p.total_pages(15), 2);
    }

    #[test]
    fn test_below_one_clamps() {
        assert_eq!(
            Pagination::build(10, Some("0"), Some("-5")),
            Pagination { page: 1, limit: 1 }
        );
    }

    #[test]
    fn test_malformed_falls_back() {
        assert_eq!(
            Pagination::build(10, Some("two"), Some("1.5")),
            Pagination { page: 1, limit: 10 }
        );
        assert_eq!(
            Pagination::build(10, Some(""), Some("")),
            Pagination { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_limit_capped() {
        assert_eq!(Pagination::build(10, None, Some("5000")).limit, MAX_LIMIT);
        assert_eq!(
            Pagination::build(10, Some("99999999999"), None).page,
            u32::MAX
        );
    }

    #[test]
    fn test_total_pages() {
        let p = Pagination::build(10, None, Some("10"));
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
        for limit in 1..=12 {
            let p = Pagination::build(10, None, Some(&limit.to_string()));
            for count in 0..50i64 {
                let expected = (count as f64 / limit as f64).ceil() as i64;
                assert_eq!(p.total_pages(count), expected);
            }
        }
    }

    #[test]
    fn test_window_sql() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM games");
        Pagination::build(10, Some("3"), Some("5")).push_window(&mut qb);
        assert_eq!(qb.sql(), "SELECT * FROM games LIMIT ? OFFSET ?");
    }
}

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{ParamValue, Params};

static TRAILING_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^(?P<base>.*?)\s+LIMIT\s+(?P<first>\d+|:\w+)(?:\s*,\s*(?P<second>\d+|:\w+)|\s+OFFSET\s+(?P<offset>\d+|:\w+))?\s*;?\s*$",
    )
    .expect("trailing LIMIT pattern is valid")
});

/// Limit/offset parsed off a query plus the number of rows the un-limited query returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalRows {
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

/// A `SELECT` with its trailing `LIMIT` clause split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
    /// `SELECT COUNT(*) FROM (<base>) AS ...`
    pub sql: String,
    pub limit: u64,
    pub offset: u64,
}

#[must_use]
pub fn is_select(sql: &str) -> bool {
    let trimmed = sql.trim_start().trim_start_matches('(').trim_start();
    trimmed
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("select"))
}

/// Split a trailing `LIMIT n`, `LIMIT n OFFSET m` or `LIMIT m, n` off `sql`.
///
/// `LIMIT a, b` follows MySQL: offset `a`, row count `b`. Placeholders (`LIMIT :limit`) are
/// resolved from `params`; unresolvable ones read as 0.
#[must_use]
pub fn split_limit<'a>(sql: &'a str, params: &Params) -> (&'a str, u64, u64) {
    let trimmed = sql.trim();
    let Some(caps) = TRAILING_LIMIT.captures(trimmed) else {
        return (trimmed.trim_end_matches(';').trim_end(), 0, 0);
    };
    let base = caps.name("base").map_or(trimmed, |m| m.as_str());
    let resolve = |name: &str| {
        caps.name(name)
            .map_or(0, |m| resolve_limit_value(m.as_str(), params))
    };
    let first = resolve("first");
    let (limit, offset) = if caps.name("second").is_some() {
        (resolve("second"), first)
    } else {
        (first, resolve("offset"))
    };
    (base, limit, offset)
}

fn resolve_limit_value(token: &str, params: &Params) -> u64 {
    if let Some(name) = token.strip_prefix(':') {
        return match params.get(name) {
            Some(ParamValue::Scalar(value)) => u64::try_from(value.to_i64()).unwrap_or_default(),
            _ => 0,
        };
    }
    token.parse().unwrap_or_default()
}

/// Build the `COUNT(*)` wrapper for a `SELECT`; `None` for anything else or blank input.
#[must_use]
pub fn count_query(sql: &str, params: &Params) -> Option<CountQuery> {
    if sql.trim().is_empty() || !is_select(sql) {
        return None;
    }
    let (base, limit, offset) = split_limit(sql, params);
    Some(CountQuery {
        sql: format!("SELECT COUNT(*) FROM ({base}) AS total_rows_count"),
        limit,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_limit_offset() {
        let none = Params::new();
        assert_eq!(
            split_limit("SELECT * FROM t LIMIT 10 OFFSET 20", &none),
            ("SELECT * FROM t", 10, 20)
        );
        assert_eq!(
            split_limit("select * from t order by id limit 5;", &none),
            ("select * from t order by id", 5, 0)
        );
        assert_eq!(
            split_limit("SELECT * FROM t LIMIT 20, 10", &none),
            ("SELECT * FROM t", 10, 20)
        );
        assert_eq!(split_limit("SELECT * FROM t", &none), ("SELECT * FROM t", 0, 0));
    }

    #[test]
    fn resolves_placeholder_limits() {
        let params = Params::new().bind("limit", 25_i64).bind("offset", 50_i64);
        assert_eq!(
            split_limit("SELECT * FROM t WHERE a = :a LIMIT :limit OFFSET :offset", &params),
            ("SELECT * FROM t WHERE a = :a", 25, 50)
        );
    }

    #[test]
    fn only_trailing_limit_is_removed() {
        let none = Params::new();
        let sql = "SELECT * FROM (SELECT id FROM t LIMIT 3) x";
        assert_eq!(split_limit(sql, &none), (sql, 0, 0));
    }

    #[test]
    fn count_query_ignores_non_select() {
        let none = Params::new();
        assert_eq!(count_query("", &none), None);
        assert_eq!(count_query("   ", &none), None);
        assert_eq!(count_query("DELETE FROM t LIMIT 1", &none), None);
        let count = count_query("SELECT * FROM t LIMIT 10 OFFSET 20", &none).unwrap();
        assert_eq!(
            count.sql,
            "SELECT COUNT(*) FROM (SELECT * FROM t) AS total_rows_count"
        );
        assert_eq!((count.limit, count.offset), (10, 20));
    }
}

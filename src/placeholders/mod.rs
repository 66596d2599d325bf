//! Named placeholder scanning and array parameter expansion.
//!
//! `WHERE id IN (:ids)` bound with `ids = [1, 2, 3]` becomes
//! `WHERE id IN (:ids_0,:ids_1,:ids_2)` with one scalar binding per element.

use std::borrow::Cow;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::DbError;
use crate::types::{ParamValue, Params};

mod parsers;
mod scanner;

use parsers::{is_block_comment_end, is_block_comment_start, is_line_comment_start};
use scanner::{State, close_quote, scan_identifier};

/// A `:name` token found outside literals and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    /// Byte offset of the colon.
    pub start: usize,
    /// Byte offset one past the last name character.
    pub end: usize,
}

/// Find every named placeholder in `sql`.
///
/// Quoted strings, backticked identifiers, comments, `::` and `:=` are skipped. Matching is
/// token based, so `:id` never matches inside `:identifier`.
#[must_use]
pub fn find_placeholders(sql: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut state = State::Normal;
    let bytes = sql.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                b':' => {
                    if bytes.get(idx + 1) == Some(&b':') {
                        idx += 2;
                        continue;
                    }
                    if let Some(end) = scan_identifier(bytes, idx + 1) {
                        found.push(Placeholder {
                            name: &sql[idx + 1..end],
                            start: idx,
                            end,
                        });
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if state == State::SingleQuoted { b'\'' } else { b'"' };
                if b == b'\\' {
                    idx += 1; // skip escaped character
                } else {
                    let (next, closed) = close_quote(bytes, idx, quote);
                    idx = next;
                    if closed {
                        state = State::Normal;
                    }
                }
            }
            State::Backticked => {
                let (next, closed) = close_quote(bytes, idx, b'`');
                idx = next;
                if closed {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    found
}

/// Distinct placeholder names referenced by `sql`.
#[must_use]
pub fn referenced_names(sql: &str) -> HashSet<&str> {
    find_placeholders(sql).into_iter().map(|p| p.name).collect()
}

/// Whether `sql` contains the placeholder `:name` as a whole token.
#[must_use]
pub fn references(sql: &str, name: &str) -> bool {
    let name = name.trim_start_matches(':');
    find_placeholders(sql).iter().any(|p| p.name == name)
}

/// Name given to element `index` of an exploded array parameter.
#[must_use]
pub fn element_name(name: &str, index: usize) -> String {
    format!("{name}_{index}")
}

/// Rewrite `sql` and `params` so every list parameter becomes a parenthesised list of
/// per-element placeholders.
///
/// Positional parameters and maps without lists come back unchanged (`Cow::Borrowed`).
/// An empty list expands to `(NULL)`, which matches nothing inside `IN (...)`.
///
/// ```rust
/// use mysql_middleware::placeholders::expand_array_params;
/// use mysql_middleware::types::Params;
///
/// let params = Params::new().bind("ids", vec![1_i64, 2, 3]);
/// let (sql, params) = expand_array_params("SELECT * FROM t WHERE id IN (:ids)", &params).unwrap();
/// assert_eq!(sql, "SELECT * FROM t WHERE id IN (:ids_0,:ids_1,:ids_2)");
/// assert_eq!(params.len(), 3);
/// ```
///
/// # Errors
/// Returns `DbError::ParameterError` if an exploded name collides with another parameter.
pub fn expand_array_params<'a>(
    sql: &'a str,
    params: &Params,
) -> Result<(Cow<'a, str>, Params), DbError> {
    let Params::Named(map) = params else {
        return Ok((Cow::Borrowed(sql), params.clone()));
    };
    if !map.values().any(ParamValue::is_list) {
        return Ok((Cow::Borrowed(sql), params.clone()));
    }

    let mut expanded: IndexMap<String, ParamValue> = IndexMap::with_capacity(map.len());
    let mut replacements: IndexMap<&str, String> = IndexMap::new();

    for (name, value) in map {
        match value {
            ParamValue::Scalar(_) => {
                if expanded.contains_key(name) {
                    return Err(collision(name));
                }
                expanded.insert(name.clone(), value.clone());
            }
            ParamValue::List(items) => {
                let mut names = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let element = element_name(name, index);
                    if map.contains_key(&element) || expanded.contains_key(&element) {
                        return Err(collision(&element));
                    }
                    names.push(format!(":{element}"));
                    expanded.insert(element, ParamValue::Scalar(item.clone()));
                }
                let list = if names.is_empty() {
                    "(NULL)".to_string()
                } else {
                    format!("({})", names.join(","))
                };
                replacements.insert(name.as_str(), list);
            }
        }
    }

    let mut out = String::with_capacity(sql.len() + replacements.len() * 16);
    let mut last = 0;
    for placeholder in find_placeholders(sql) {
        if let Some(list) = replacements.get(placeholder.name) {
            out.push_str(&sql[last..placeholder.start]);
            out.push_str(list);
            last = placeholder.end;
        }
    }
    out.push_str(&sql[last..]);

    Ok((Cow::Owned(out), Params::Named(expanded)))
}

fn collision(name: &str) -> DbError {
    DbError::ParameterError(format!(
        "expanded parameter ':{name}' collides with an existing parameter"
    ))
}

//! SQL generation for single-row CRUD helpers.
//!
//! Every column becomes a `(column, placeholder)` pair; identifier validation and quoting
//! live here so the façade never concatenates caller input into SQL.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DbError;
use crate::types::{ParamValue, Params};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Check a column (or database) name.
///
/// # Errors
/// Returns `DbError::ParameterError` for anything that is not a plain identifier.
pub fn validate_identifier(name: &str) -> Result<&str, DbError> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(DbError::ParameterError(format!("invalid identifier '{name}'")))
    }
}

/// Check a table name, optionally qualified as `database.table`.
///
/// # Errors
/// Returns `DbError::ParameterError` if any part is not a plain identifier.
pub fn validate_table(name: &str) -> Result<&str, DbError> {
    let mut parts = name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, None) => IDENTIFIER.is_match(table),
        (Some(db), Some(table), None) => IDENTIFIER.is_match(db) && IDENTIFIER.is_match(table),
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(DbError::ParameterError(format!("invalid table name '{name}'")))
    }
}

/// Backtick-quote an identifier (or each part of `db.table`).
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("`{}`", part.replace('`', "``")))
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnBinding {
    column: String,
    placeholder: String,
}

impl ColumnBinding {
    fn assignment(&self) -> String {
        format!("{}=:{}", self.column, self.placeholder)
    }
}

/// Builds single-table DML from a column -> value map.
#[derive(Debug, Clone)]
pub struct DmlBuilder {
    table: String,
    bindings: Vec<ColumnBinding>,
}

impl DmlBuilder {
    /// # Errors
    /// Returns `DbError::ParameterError` for an invalid table name.
    pub fn new(table: &str) -> Result<Self, DbError> {
        Ok(Self {
            table: validate_table(table)?.to_string(),
            bindings: Vec::new(),
        })
    }

    /// Builder over every column in a named parameter map.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for positional maps, list values, or invalid names.
    pub fn from_params(table: &str, values: &Params) -> Result<Self, DbError> {
        let Params::Named(map) = values else {
            return Err(DbError::ParameterError(
                "column values must be a named parameter map".into(),
            ));
        };
        let mut builder = Self::new(table)?;
        for (column, value) in map {
            if matches!(value, ParamValue::List(_)) {
                return Err(DbError::ParameterError(format!(
                    "column '{column}' cannot take a list value"
                )));
            }
            builder.column(column)?;
        }
        Ok(builder)
    }

    /// Add a column bound to a placeholder of the same name.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for an invalid column name.
    pub fn column(&mut self, column: &str) -> Result<&mut Self, DbError> {
        let column = validate_identifier(column)?;
        self.bindings.push(ColumnBinding {
            column: column.to_string(),
            placeholder: column.to_string(),
        });
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.column.as_str()).collect()
    }

    fn require_columns(&self, verb: &str) -> Result<(), DbError> {
        if self.bindings.is_empty() {
            Err(DbError::ParameterError(format!(
                "{verb} on '{}' needs at least one column",
                self.table
            )))
        } else {
            Ok(())
        }
    }

    fn column_list(&self) -> String {
        let quoted: Vec<String> = self
            .bindings
            .iter()
            .map(|b| quote_identifier(&b.column))
            .collect();
        quoted.join(",")
    }

    fn placeholder_list(&self) -> String {
        let names: Vec<String> = self
            .bindings
            .iter()
            .map(|b| format!(":{}", b.placeholder))
            .collect();
        names.join(",")
    }

    /// `INSERT [IGNORE] INTO table (`a`,`b`) VALUES (:a,:b)`
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` when there are no columns.
    pub fn insert(&self, ignore: bool) -> Result<String, DbError> {
        self.require_columns("INSERT")?;
        let verb = if ignore { "INSERT IGNORE" } else { "INSERT" };
        Ok(format!(
            "{verb} INTO {} ({}) VALUES ({})",
            self.table,
            self.column_list(),
            self.placeholder_list()
        ))
    }

    /// `UPDATE table SET a=:a,b=:b WHERE pk=:pk`; the key column never appears in `SET`.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` if the key column is missing or nothing else is set.
    pub fn update(&self, primary_key: &str) -> Result<String, DbError> {
        let key = self.key_binding(primary_key)?;
        let assignments: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| b.column != primary_key)
            .map(ColumnBinding::assignment)
            .collect();
        if assignments.is_empty() {
            return Err(DbError::ParameterError(format!(
                "UPDATE on '{}' has no columns besides '{primary_key}'",
                self.table
            )));
        }
        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            self.table,
            assignments.join(","),
            key.assignment()
        ))
    }

    /// `DELETE FROM table WHERE a=:a AND b=:b`. Refuses to build an unconditional delete.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` when there are no conditions.
    pub fn delete(&self) -> Result<String, DbError> {
        self.require_columns("DELETE")?;
        let conditions: Vec<String> = self
            .bindings
            .iter()
            .map(ColumnBinding::assignment)
            .collect();
        Ok(format!(
            "DELETE FROM {} WHERE {}",
            self.table,
            conditions.join(" AND ")
        ))
    }

    /// `INSERT ... ON DUPLICATE KEY UPDATE` for every non-key column; falls back to
    /// `INSERT IGNORE` when the key is the only column.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` if the key column is missing.
    pub fn upsert(&self, primary_key: &str) -> Result<String, DbError> {
        self.key_binding(primary_key)?;
        let updates: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| b.column != primary_key)
            .map(|b| {
                let quoted = quote_identifier(&b.column);
                format!("{quoted}=VALUES({quoted})")
            })
            .collect();
        if updates.is_empty() {
            return self.insert(true);
        }
        Ok(format!(
            "{} ON DUPLICATE KEY UPDATE {}",
            self.insert(false)?,
            updates.join(",")
        ))
    }

    fn key_binding(&self, primary_key: &str) -> Result<&ColumnBinding, DbError> {
        validate_identifier(primary_key)?;
        self.bindings
            .iter()
            .find(|b| b.column == primary_key)
            .ok_or_else(|| {
                DbError::ParameterError(format!(
                    "primary key '{primary_key}' missing from values for '{}'",
                    self.table
                ))
            })
    }
}

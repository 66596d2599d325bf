use indexmap::IndexMap;
use serde::Serialize;

use crate::driver::ExecOutcome;
use crate::error::DbError;
use crate::hydrate::FromRow;
use crate::placeholders::expand_array_params;
use crate::query_utils::{TotalRows, count_query};
use crate::results::Row;
use crate::statement::Statement;
use crate::types::{Params, SqlValue};

use super::Database;

/// Result of [`Database::query_list`]: a lookup table when a key column is given, otherwise a
/// flat list of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValueList {
    Map(IndexMap<String, SqlValue>),
    List(Vec<SqlValue>),
}

impl ValueList {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ValueList::Map(map) => map.len(),
            ValueList::List(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value for `key`; `None` for flat lists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        match self {
            ValueList::Map(map) => map.get(key),
            ValueList::List(_) => None,
        }
    }
}

impl Database {
    /// Expand, filter, trace and run a row-returning statement, leaving its rows buffered.
    pub(super) async fn run_query(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> Result<Statement, DbError> {
        let (sql, params) = expand_array_params(sql, params)?;
        let mut statement = Statement::new(sql.into_owned(), self.log.clone());
        let result = statement.query(self.driver()?, &params).await;
        self.remember(&statement);
        result.map(|()| statement)
    }

    pub(super) async fn run_execute(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> Result<ExecOutcome, DbError> {
        let (sql, params) = expand_array_params(sql, params)?;
        let mut statement = Statement::new(sql.into_owned(), self.log.clone());
        let result = statement.execute(self.driver()?, &params).await;
        self.remember(&statement);
        let outcome = result?;
        if let Some(id) = outcome.last_insert_id.filter(|id| *id != 0) {
            self.last_insert_id = Some(id);
        }
        Ok(outcome)
    }

    /// Run a DML statement and return the number of affected rows. A non-zero auto-increment
    /// id is kept for [`last_insert_id`](Self::last_insert_id).
    ///
    /// # Errors
    /// Returns `DbError::QueryError` (SQL, code, bound parameters) if the statement fails.
    pub async fn execute(&mut self, sql: &str, params: &Params) -> Result<u64, DbError> {
        Ok(self.run_execute(sql, params).await?.rows_affected)
    }

    /// Every row hydrated as `T`.
    ///
    /// ```rust,no_run
    /// # use mysql_middleware::prelude::*;
    /// # async fn run(db: &mut Database) -> Result<(), DbError> {
    /// let ids = Params::new().bind("ids", vec![1_i64, 2]);
    /// let rows: Vec<Row> = db.query("SELECT * FROM users WHERE id IN (:ids)", &ids).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns `DbError::QueryError` on failure, or `DbError::ConversionError` if a row does
    /// not fit `T`.
    pub async fn query<T: FromRow>(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> Result<Vec<T>, DbError> {
        self.run_query(sql, params).await?.fetch_all()
    }

    /// First row hydrated as `T`, or `None` when nothing matched.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` on failure, or `DbError::ConversionError` if the row does
    /// not fit `T`.
    pub async fn query_one<T: FromRow>(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> Result<Option<T>, DbError> {
        self.run_query(sql, params).await?.fetch_mapped_object()
    }

    /// First column of the first row; `SqlValue::Null` when there is no row.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` on failure.
    pub async fn query_val(&mut self, sql: &str, params: &Params) -> Result<SqlValue, DbError> {
        let row: Option<Row> = self.query_one(sql, params).await?;
        Ok(row
            .and_then(|row| row.values.into_iter().next())
            .unwrap_or(SqlValue::Null))
    }

    /// # Errors
    /// Returns `DbError::QueryError` on failure.
    pub async fn query_int(&mut self, sql: &str, params: &Params) -> Result<i64, DbError> {
        Ok(self.query_val(sql, params).await?.to_i64())
    }

    /// # Errors
    /// Returns `DbError::QueryError` on failure.
    pub async fn query_string(&mut self, sql: &str, params: &Params) -> Result<String, DbError> {
        Ok(self.query_val(sql, params).await?.to_text())
    }

    /// # Errors
    /// Returns `DbError::QueryError` on failure.
    pub async fn query_float(&mut self, sql: &str, params: &Params) -> Result<f64, DbError> {
        Ok(self.query_val(sql, params).await?.to_f64())
    }

    /// # Errors
    /// Returns `DbError::QueryError` on failure.
    pub async fn query_bool(&mut self, sql: &str, params: &Params) -> Result<bool, DbError> {
        Ok(self.query_val(sql, params).await?.to_bool())
    }

    /// Lookup table from two result columns, `key -> value`. With an empty `key` the values
    /// come back as a flat list. Later rows overwrite earlier ones with the same key.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` on failure, or `DbError::ConversionError` if a named
    /// column is missing from the result.
    pub async fn query_list(
        &mut self,
        sql: &str,
        key: &str,
        value: &str,
        params: &Params,
    ) -> Result<ValueList, DbError> {
        let mut statement = self.run_query(sql, params).await?;
        if key.is_empty() {
            let mut values = Vec::new();
            while let Some(row) = statement.fetch_assoc() {
                values.push(row.try_get(value)?.clone());
            }
            return Ok(ValueList::List(values));
        }
        let mut map = IndexMap::new();
        while let Some(row) = statement.fetch_assoc() {
            map.insert(row.try_get(key)?.to_text(), row.try_get(value)?.clone());
        }
        Ok(ValueList::Map(map))
    }

    /// Full rows hydrated as `T`, indexed by the text of column `key`.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` on failure, or `DbError::ConversionError` if `key` is
    /// missing or a row does not fit `T`.
    pub async fn query_assoc<T: FromRow>(
        &mut self,
        sql: &str,
        key: &str,
        params: &Params,
    ) -> Result<IndexMap<String, T>, DbError> {
        let mut statement = self.run_query(sql, params).await?;
        let mut map = IndexMap::new();
        while let Some(row) = statement.fetch_assoc() {
            let index = row.try_get(key)?.to_text();
            map.insert(index, T::from_row(&row)?);
        }
        Ok(map)
    }

    /// Parse the trailing `LIMIT` off a `SELECT` and count every row the query matches without
    /// it. Non-`SELECT` or blank input yields all zeroes.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` if the count query fails.
    pub async fn count_total_rows(
        &mut self,
        sql: &str,
        params: &Params,
    ) -> Result<TotalRows, DbError> {
        let (sql, params) = expand_array_params(sql, params)?;
        let Some(count) = count_query(&sql, &params) else {
            return Ok(TotalRows::default());
        };
        let total = self.query_int(&count.sql, &params).await?;
        Ok(TotalRows {
            limit: count.limit,
            offset: count.offset,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    /// Rows the most recent statement would match without its `LIMIT`, counted with the
    /// parameters it was bound with. `0` when nothing has run or it was not a `SELECT`.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` if the count query fails.
    pub async fn last_total_rows(&mut self) -> Result<u64, DbError> {
        let Some(statement) = self.last_statement.as_ref() else {
            return Ok(0);
        };
        let Some(driver) = self.handle.as_deref_mut() else {
            return Err(DbError::NotConnected);
        };
        statement.get_total_rows(driver).await
    }
}

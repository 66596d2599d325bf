use serde::Serialize;

use crate::error::DbError;
use crate::query_builder::DmlBuilder;
use crate::types::Params;

use super::Database;

impl Database {
    /// Insert one row from a column -> value map and return the generated auto-increment id,
    /// or `0` when the table has none.
    ///
    /// ```rust,no_run
    /// # use mysql_middleware::prelude::*;
    /// # async fn run(db: &mut Database) -> Result<(), DbError> {
    /// let id = db
    ///     .insert("users", &Params::new().bind("email", "a@b.c").bind("active", true))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for invalid identifiers or an empty map, and
    /// `DbError::QueryError` if the insert fails.
    pub async fn insert(&mut self, table: &str, values: &Params) -> Result<u64, DbError> {
        let sql = DmlBuilder::from_params(table, values)?.insert(false)?;
        let outcome = self.run_execute(&sql, values).await?;
        Ok(outcome.last_insert_id.unwrap_or_default())
    }

    /// [`insert`](Self::insert) for any struct or map that serializes to an object.
    ///
    /// # Errors
    /// Same as `insert`, plus `DbError::ParameterError` if `value` is not an object.
    pub async fn insert_object<T: Serialize + ?Sized>(
        &mut self,
        table: &str,
        value: &T,
    ) -> Result<u64, DbError> {
        let values = Params::from_serialize(value)?;
        self.insert(table, &values).await
    }

    /// `INSERT IGNORE`; returns the number of rows actually inserted.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for invalid identifiers or an empty map, and
    /// `DbError::QueryError` if the statement fails.
    pub async fn insert_ignore(&mut self, table: &str, values: &Params) -> Result<u64, DbError> {
        let sql = DmlBuilder::from_params(table, values)?.insert(true)?;
        self.execute(&sql, values).await
    }

    /// Update the row identified by `primary_key`, which must be present in `values`.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` if the key is missing or there is nothing to set, and
    /// `DbError::QueryError` if the statement fails.
    pub async fn update(
        &mut self,
        table: &str,
        primary_key: &str,
        values: &Params,
    ) -> Result<u64, DbError> {
        let sql = DmlBuilder::from_params(table, values)?.update(primary_key)?;
        self.execute(&sql, values).await
    }

    /// Delete rows matching every supplied column. An empty map is rejected.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` when there are no conditions, and
    /// `DbError::QueryError` if the statement fails.
    pub async fn delete(&mut self, table: &str, values: &Params) -> Result<u64, DbError> {
        let sql = DmlBuilder::from_params(table, values)?.delete()?;
        self.execute(&sql, values).await
    }

    /// Upsert keyed on `primary_key`. With only the key supplied this is an `INSERT IGNORE`.
    /// Returns MySQL's row count (1 inserted, 2 updated, 0 unchanged).
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for invalid input, and `DbError::QueryError` if the
    /// statement fails.
    pub async fn insert_update(
        &mut self,
        table: &str,
        primary_key: &str,
        values: &Params,
    ) -> Result<u64, DbError> {
        let sql = DmlBuilder::from_params(table, values)?.upsert(primary_key)?;
        self.execute(&sql, values).await
    }
}

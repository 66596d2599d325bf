use crate::error::DbError;
use crate::query_builder::{quote_identifier, validate_identifier, validate_table};
use crate::types::Params;

use super::Database;

const SHOW_FULL_TABLES: &str = "SHOW FULL TABLES";
const SHOW_DATABASES: &str = "SHOW DATABASES";

impl Database {
    /// Whether `table` exists in the current database, or in `db` for `db.table`.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for an invalid name, or a query error.
    pub async fn table_exists(&mut self, table: &str) -> Result<bool, DbError> {
        let table = validate_table(table)?;
        let (sql, params) = match table.split_once('.') {
            Some((schema, name)) => (
                "SELECT COUNT(*) FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = :schema AND TABLE_NAME = :table",
                Params::new().bind("schema", schema).bind("table", name),
            ),
            None => (
                "SELECT COUNT(*) FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = :table",
                Params::new().bind("table", table),
            ),
        };
        Ok(self.query_int(sql, &params).await? > 0)
    }

    /// # Errors
    /// Returns `DbError::ParameterError` for an invalid name, or a query error.
    pub async fn database_exists(&mut self, database: &str) -> Result<bool, DbError> {
        let database = validate_identifier(database)?;
        let count = self
            .query_int(
                "SELECT COUNT(*) FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = :database",
                &Params::new().bind("database", database),
            )
            .await?;
        Ok(count > 0)
    }

    /// Tables in the current database; views are included only on request.
    ///
    /// # Errors
    /// Returns a query error.
    pub async fn get_table_list(&mut self, include_views: bool) -> Result<Vec<String>, DbError> {
        let mut statement = self.run_query(SHOW_FULL_TABLES, &Params::new()).await?;
        let mut tables = Vec::new();
        while let Some(row) = statement.fetch_assoc() {
            let Some(name) = row.get_by_index(0).map(|v| v.to_text()) else {
                continue;
            };
            let is_view = row
                .get("Table_type")
                .or_else(|| row.get_by_index(1))
                .is_some_and(|kind| kind.to_text().eq_ignore_ascii_case("VIEW"));
            if include_views || !is_view {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    /// # Errors
    /// Returns a query error.
    pub async fn get_database_list(&mut self) -> Result<Vec<String>, DbError> {
        let mut statement = self.run_query(SHOW_DATABASES, &Params::new()).await?;
        let mut databases = Vec::new();
        while let Some(row) = statement.fetch_assoc() {
            if let Some(name) = row.get_by_index(0) {
                databases.push(name.to_text());
            }
        }
        Ok(databases)
    }

    /// `DROP TABLE IF EXISTS ... CASCADE` with foreign-key and unique checks off.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for an invalid name, or a query error. The checks are
    /// switched back on even when the drop fails.
    pub async fn drop_table(&mut self, table: &str) -> Result<(), DbError> {
        let table = quote_identifier(validate_table(table)?);
        let sql = format!("DROP TABLE IF EXISTS {table} CASCADE");
        self.without_key_checks(async |db: &mut Database| db.run_raw(&sql).await)
            .await
    }

    /// Drop every base table in the current database and return their names.
    ///
    /// # Errors
    /// Returns the first failure; tables dropped before it stay dropped.
    pub async fn drop_all_tables(&mut self) -> Result<Vec<String>, DbError> {
        let tables = self.get_table_list(false).await?;
        self.without_key_checks(async |db: &mut Database| {
            for table in &tables {
                db.run_raw(&format!("DROP TABLE IF EXISTS {} CASCADE", quote_identifier(table)))
                    .await?;
            }
            Ok(())
        })
        .await?;
        Ok(tables)
    }

    async fn without_key_checks<T, F>(&mut self, f: F) -> Result<T, DbError>
    where
        F: AsyncFnOnce(&mut Database) -> Result<T, DbError>,
    {
        self.run_raw("SET FOREIGN_KEY_CHECKS=0").await?;
        let result = match self.run_raw("SET UNIQUE_CHECKS=0").await {
            Ok(()) => f(self).await,
            Err(e) => Err(e),
        };
        let unique = self.run_raw("SET UNIQUE_CHECKS=1").await;
        let foreign = self.run_raw("SET FOREIGN_KEY_CHECKS=1").await;
        let value = result?;
        unique?;
        foreign?;
        Ok(value)
    }
}

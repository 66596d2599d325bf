use indexmap::IndexMap;

use crate::error::DbError;
use crate::query_builder::{quote_identifier, validate_table};
use crate::schema::ColumnDescriptor;
use crate::types::Params;

use super::Database;

/// `ER_NO_SUCH_TABLE`
const NO_SUCH_TABLE: u16 = 1146;
/// `ER_BAD_DB_ERROR`
const BAD_DATABASE: u16 = 1049;

impl Database {
    /// Column descriptors for `table`, keyed by field name in table order.
    ///
    /// # Errors
    /// Returns `DbError::SchemaError` naming the table and database if the table does not
    /// exist, `DbError::ParameterError` for an invalid name, or a query error.
    pub async fn get_table_info(
        &mut self,
        table: &str,
    ) -> Result<IndexMap<String, ColumnDescriptor>, DbError> {
        let table = validate_table(table)?;
        let sql = format!("DESCRIBE {}", quote_identifier(table));
        let mut statement = match self.run_query(&sql, &Params::new()).await {
            Ok(statement) => statement,
            Err(e) if matches!(e.code(), Some(NO_SUCH_TABLE | BAD_DATABASE)) => {
                let (database, name) = match table.split_once('.') {
                    Some((database, name)) => (database.to_string(), name),
                    None => (self.database.clone(), table),
                };
                return Err(DbError::SchemaError {
                    table: name.to_string(),
                    database,
                });
            }
            Err(e) => return Err(e),
        };

        let mut columns = IndexMap::new();
        while let Some(row) = statement.fetch_assoc() {
            let column = ColumnDescriptor::from_describe_row(&row)?;
            columns.insert(column.field.clone(), column);
        }
        Ok(columns)
    }
}

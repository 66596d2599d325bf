use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[cfg(feature = "mysql")]
    #[error(transparent)]
    MysqlError(#[from] mysql_async::Error),

    /// The handle could not be opened or reconfigured. Carries the target host/port for
    /// diagnostics; the password never ends up here.
    #[error("Connection error ({host}:{port}): {message}")]
    ConnectionError {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Query error [{code}]: {message} (sql: {sql}, params: {params})")]
    QueryError {
        sql: String,
        params: String,
        code: u16,
        message: String,
    },

    #[error("Table '{table}' does not exist in database '{database}'")]
    SchemaError { table: String, database: String },

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Connection stack is empty: pop_connection called without a matching push")]
    ConnectionStackEmpty,

    #[error("No open connection")]
    NotConnected,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),
}

impl DbError {
    /// Build a `QueryError` for a failed statement.
    pub(crate) fn query(
        sql: &str,
        params: &crate::types::Params,
        code: u16,
        message: impl Into<String>,
    ) -> Self {
        DbError::QueryError {
            sql: sql.to_string(),
            params: params.describe(),
            code,
            message: message.into(),
        }
    }

    /// Native server error code for query failures, if one was reported.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            DbError::QueryError { code, .. } if *code != 0 => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

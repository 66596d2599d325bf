//! The seam between the query layer and a native database handle.

use async_trait::async_trait;

use crate::config::ConnectOptions;
use crate::dsn::Dsn;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::Params;

/// What a DML statement reports back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    /// Auto-increment id generated by the statement, when there was one.
    pub last_insert_id: Option<u64>,
}

/// A single open native handle.
///
/// Parameters arrive already expanded and filtered: named maps only hold scalars whose
/// placeholders occur in `sql`.
#[async_trait]
pub trait Driver: Send {
    /// Executes a single DML statement and reports affected rows and the generated id.
    async fn execute(&mut self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError>;

    /// Executes a single SELECT-like statement and returns the result set.
    async fn query(&mut self, sql: &str, params: &Params) -> Result<ResultSet, DbError>;

    /// Executes raw SQL text without parameters (transaction control, session settings).
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError>;
}

/// Opens native handles for a DSN.
#[async_trait]
pub trait Connector: Send + Sync {
    /// # Errors
    /// Implementations return `DbError::ConnectionError` (with host/port, never the password)
    /// when the handle cannot be opened.
    async fn open(&self, dsn: &Dsn, options: &ConnectOptions)
    -> Result<Box<dyn Driver>, DbError>;
}

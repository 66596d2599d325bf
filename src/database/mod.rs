//! The session object: one native handle plus everything tracked about it.

mod admin;
mod core;
mod dml;
mod schema;
mod select;
mod tx;

use std::fmt;
use std::sync::Arc;

use crate::config::ConnectOptions;
use crate::driver::{Connector, Driver};
use crate::dsn::Dsn;
use crate::error::DbError;
use crate::logging::{LogLevel, QueryLog, QueryLogger};
use crate::statement::Statement;
use crate::types::Params;

pub use select::ValueList;
pub use tx::savepoint_name;

/// Connection target saved by [`Database::push_connection`].
#[derive(Debug, Clone)]
struct SavedConnection {
    dsn: Dsn,
    options: ConnectOptions,
    timezone: Option<String>,
}

/// A single database connection and its bookkeeping.
///
/// Exactly one native handle is open at a time. Every operation takes `&mut self`, so
/// statements reach the server in the order they were issued. Switching targets temporarily
/// goes through the strictly nested [`push_connection`](Self::push_connection) /
/// [`pop_connection`](Self::pop_connection) pair.
pub struct Database {
    connector: Arc<dyn Connector>,
    handle: Option<Box<dyn Driver>>,
    dsn: Dsn,
    options: ConnectOptions,
    database: String,
    timezone: Option<String>,
    last_query: String,
    last_params: Params,
    last_insert_id: Option<u64>,
    last_statement: Option<Statement>,
    depth: u32,
    stack: Vec<SavedConnection>,
    log: QueryLog,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("dsn", &self.dsn)
            .field("connected", &self.handle.is_some())
            .field("database", &self.database)
            .field("timezone", &self.timezone)
            .field("transaction_depth", &self.depth)
            .field("saved_connections", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// A disconnected session that will open handles through `connector`.
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            handle: None,
            dsn: Dsn::default(),
            options: ConnectOptions::default(),
            database: String::new(),
            timezone: None,
            last_query: String::new(),
            last_params: Params::new(),
            last_insert_id: None,
            last_statement: None,
            depth: 0,
            stack: Vec::new(),
            log: QueryLog::default(),
        }
    }

    /// Route query tracing to a custom sink instead of `tracing`.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn QueryLogger>) -> Self {
        self.log = QueryLog::new(logger);
        self
    }

    /// Create a session and connect it.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the handle cannot be opened.
    pub async fn open(
        connector: impl Connector + 'static,
        dsn: &str,
        options: ConnectOptions,
    ) -> Result<Self, DbError> {
        let mut db = Self::new(connector);
        db.connect(dsn, options).await?;
        Ok(db)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    #[must_use]
    pub fn current_database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn current_timezone(&self) -> Option<&str> {
        self.timezone.as_deref()
    }

    /// SQL text of the most recently executed statement, after array expansion.
    #[must_use]
    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    /// Parameters bound to the most recently executed statement, after filtering.
    #[must_use]
    pub fn last_params(&self) -> &Params {
        &self.last_params
    }

    /// Most recent non-zero auto-increment id produced on this connection.
    #[must_use]
    pub fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    #[must_use]
    pub fn transaction_depth(&self) -> u32 {
        self.depth
    }

    /// The query log, e.g. to suspend tracing around a noisy section.
    #[must_use]
    pub fn query_log(&self) -> &QueryLog {
        &self.log
    }

    fn driver(&mut self) -> Result<&mut dyn Driver, DbError> {
        match self.handle.as_deref_mut() {
            Some(driver) => Ok(driver),
            None => Err(DbError::NotConnected),
        }
    }

    fn remember(&mut self, statement: &Statement) {
        self.last_query = statement.sql().to_string();
        self.last_params = statement.bound_params().clone();
        self.last_statement = Some(statement.snapshot());
    }

    /// Run raw SQL text (session settings, DDL) with tracing and last-query bookkeeping.
    async fn run_raw(&mut self, sql: &str) -> Result<(), DbError> {
        self.log.log(LogLevel::Debug, sql);
        self.last_query = sql.to_string();
        self.last_params = Params::new();
        let empty = Params::new();
        self.driver()?
            .execute_batch(sql)
            .await
            .map_err(|e| match e {
                DbError::QueryError { code, message, .. } => {
                    DbError::query(sql, &empty, code, message)
                }
                other => other,
            })
    }
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::ConnectOptions;
use crate::driver::{Connector, Driver, ExecOutcome};
use crate::dsn::Dsn;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::{Params, SqlValue};

/// Which driver entry point a statement went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Execute,
    Query,
    Batch,
}

/// One statement as the driver received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Params,
}

#[derive(Debug, Clone)]
enum Response {
    Rows(ResultSet),
    Outcome(ExecOutcome),
    Fail { code: u16, message: String },
}

#[derive(Debug)]
struct Rule {
    prefix: String,
    response: Response,
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<Rule>,
    statements: Vec<RecordedStatement>,
    connections: Vec<Dsn>,
    refuse: bool,
}

impl MockState {
    // Latest matching rule wins.
    fn response_for(&self, sql: &str) -> Option<Response> {
        let sql = sql.trim_start();
        self.rules
            .iter()
            .rev()
            .find(|rule| {
                sql.get(..rule.prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(&rule.prefix))
            })
            .map(|rule| rule.response.clone())
    }
}

/// Scriptable connector whose handles record every statement.
///
/// Responses are matched on a case-insensitive SQL prefix. Unmatched `execute` calls report
/// one affected row, unmatched queries return no rows.
///
/// ```rust
/// use mysql_middleware::test_utils::MockConnector;
/// use mysql_middleware::types::SqlValue;
///
/// let mock = MockConnector::new();
/// mock.rows("SELECT COUNT(*)", &["COUNT(*)"], vec![vec![SqlValue::Int(35)]]);
/// mock.fail("DESCRIBE `missing`", 1146, "Table 'app.missing' doesn't exist");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_rule(&self, prefix: &str, response: Response) -> &Self {
        self.lock().rules.push(Rule {
            prefix: prefix.trim_start().to_string(),
            response,
        });
        self
    }

    /// Answer statements starting with `prefix` with these rows.
    pub fn rows(&self, prefix: &str, columns: &[&str], rows: Vec<Vec<SqlValue>>) -> &Self {
        let columns = columns.iter().map(|c| (*c).to_string()).collect();
        self.push_rule(prefix, Response::Rows(ResultSet::from_rows(columns, rows)))
    }

    /// Answer DML starting with `prefix` with this outcome.
    pub fn respond(
        &self,
        prefix: &str,
        rows_affected: u64,
        last_insert_id: Option<u64>,
    ) -> &Self {
        self.push_rule(
            prefix,
            Response::Outcome(ExecOutcome {
                rows_affected,
                last_insert_id,
            }),
        )
    }

    /// Fail statements starting with `prefix` with a server error.
    pub fn fail(&self, prefix: &str, code: u16, message: &str) -> &Self {
        self.push_rule(
            prefix,
            Response::Fail {
                code,
                message: message.to_string(),
            },
        )
    }

    /// Make subsequent `open` calls fail with a connection error.
    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse = refuse;
    }

    /// SQL text of every statement received, in order.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        self.lock()
            .statements
            .iter()
            .map(|s| s.sql.clone())
            .collect()
    }

    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedStatement> {
        self.lock().statements.clone()
    }

    #[must_use]
    pub fn last_statement(&self) -> Option<RecordedStatement> {
        self.lock().statements.last().cloned()
    }

    /// Every DSN a handle was opened for, in order.
    #[must_use]
    pub fn connections(&self) -> Vec<Dsn> {
        self.lock().connections.clone()
    }

    /// Forget recorded statements; rules and connections are kept.
    pub fn clear(&self) {
        self.lock().statements.clear();
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(
        &self,
        dsn: &Dsn,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn Driver>, DbError> {
        let mut state = self.lock();
        if state.refuse {
            return Err(DbError::ConnectionError {
                host: dsn.host_or_default().to_string(),
                port: dsn.port_or_default(),
                message: "connection refused".into(),
            });
        }
        state.connections.push(dsn.clone());
        Ok(Box::new(MockDriver {
            state: self.state.clone(),
        }))
    }
}

/// Handle opened by [`MockConnector`].
#[derive(Debug)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    fn record(&self, kind: StatementKind, sql: &str, params: &Params) -> Option<Response> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.statements.push(RecordedStatement {
            kind,
            sql: sql.to_string(),
            params: params.clone(),
        });
        state.response_for(sql)
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn execute(&mut self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError> {
        match self.record(StatementKind::Execute, sql, params) {
            Some(Response::Fail { code, message }) => {
                Err(DbError::query(sql, params, code, message))
            }
            Some(Response::Outcome(outcome)) => Ok(outcome),
            Some(Response::Rows(rows)) => Ok(ExecOutcome {
                rows_affected: rows.len() as u64,
                last_insert_id: None,
            }),
            None => Ok(ExecOutcome {
                rows_affected: 1,
                last_insert_id: None,
            }),
        }
    }

    async fn query(&mut self, sql: &str, params: &Params) -> Result<ResultSet, DbError> {
        match self.record(StatementKind::Query, sql, params) {
            Some(Response::Fail { code, message }) => {
                Err(DbError::query(sql, params, code, message))
            }
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Outcome(_)) | None => Ok(ResultSet::default()),
        }
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError> {
        let params = Params::new();
        match self.record(StatementKind::Batch, sql, &params) {
            Some(Response::Fail { code, message }) => {
                Err(DbError::query(sql, &params, code, message))
            }
            _ => Ok(()),
        }
    }
}

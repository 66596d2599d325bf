use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row as MySqlRow};

use crate::config::ConnectOptions;
use crate::driver::{Connector, Driver, ExecOutcome};
use crate::dsn::Dsn;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::Params;

use super::config::build_opts;
use super::params::convert;
use super::query::{build_result_set, query_error};

/// Opens `mysql_async` connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    async fn open(
        &self,
        dsn: &Dsn,
        options: &ConnectOptions,
    ) -> Result<Box<dyn Driver>, DbError> {
        let conn = Conn::new(build_opts(dsn, options))
            .await
            .map_err(|e| DbError::ConnectionError {
                host: dsn.host_or_default().to_string(),
                port: dsn.port_or_default(),
                message: e.to_string(),
            })?;
        Ok(Box::new(MySqlDriver { conn }))
    }
}

/// One open `mysql_async` connection.
#[derive(Debug)]
pub struct MySqlDriver {
    conn: Conn,
}

#[async_trait]
impl Driver for MySqlDriver {
    async fn execute(&mut self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError> {
        let native = convert(params)?;
        self.conn
            .exec_drop(sql, native)
            .await
            .map_err(|e| query_error(sql, params, e))?;
        Ok(ExecOutcome {
            rows_affected: self.conn.affected_rows(),
            last_insert_id: self.conn.last_insert_id(),
        })
    }

    async fn query(&mut self, sql: &str, params: &Params) -> Result<ResultSet, DbError> {
        // Statements without parameters go over the text protocol, which also accepts
        // `SHOW` and `DESCRIBE`.
        let rows: Result<Vec<MySqlRow>, _> = if params.is_empty() {
            self.conn.query(sql).await
        } else {
            let native = convert(params)?;
            self.conn.exec(sql, native).await
        };
        let rows = rows.map_err(|e| query_error(sql, params, e))?;
        Ok(build_result_set(rows))
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError> {
        self.conn
            .query_drop(sql)
            .await
            .map_err(|e| query_error(sql, &Params::new(), e))
    }
}

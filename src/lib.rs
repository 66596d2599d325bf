//! Single-connection MySQL access core.
//!
//! A [`Database`] owns one native handle and layers on top of it:
//! named `:placeholder` parameters with array expansion (`IN (:ids)`), typed query helpers,
//! CRUD builders, nested transactions through savepoints, a connection stack for temporary
//! target switches, and `DESCRIBE`-based schema introspection.
//!
//! ```rust,no_run
//! use mysql_middleware::prelude::*;
//!
//! # async fn run() -> Result<(), DbError> {
//! let options = ConnectOptions::default().with_timezone("+00:00");
//! let mut db = Database::open(MySqlConnector, "localhost/app/secret/shop", options).await?;
//!
//! db.begin().await?;
//! let id = db.insert("orders", &Params::new().bind("customer_id", 7_i64)).await?;
//! db.commit().await?;
//!
//! let ids = Params::new().bind("ids", vec![id, 1]);
//! let orders: Vec<Row> = db.query("SELECT * FROM orders WHERE id IN (:ids)", &ids).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod driver;
pub mod dsn;
pub mod error;
pub mod hydrate;
pub mod logging;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod placeholders;
pub mod prelude;
pub mod query_builder;
pub mod query_utils;
pub mod results;
pub mod schema;
pub mod statement;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use database::Database;
pub use error::{DbError, Result};
pub use results::{ResultSet, Row};
pub use types::{ParamValue, Params, SqlValue};

//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::ConnectOptions;
pub use crate::database::{Database, ValueList, savepoint_name};
pub use crate::driver::{Connector, Driver, ExecOutcome};
pub use crate::dsn::Dsn;
pub use crate::error::DbError;
pub use crate::hydrate::{FromRow, Hydration, RowMappable};
pub use crate::logging::{LogLevel, QueryLogger, TracingLogger};
pub use crate::query_utils::TotalRows;
pub use crate::results::{ResultSet, Row};
pub use crate::schema::{ColumnDescriptor, LogicalType};
pub use crate::types::{ParamValue, Params, SqlValue};

#[cfg(feature = "mysql")]
pub use crate::mysql::MySqlConnector;

// MySQL backend - `mysql_async` behind the `Connector`/`Driver` seam
//
// - config: DSN + options -> native connection options
// - params: parameter conversion into native values
// - query: native rows and errors back into crate types
// - executor: the connector and the per-handle driver

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use executor::{MySqlConnector, MySqlDriver};

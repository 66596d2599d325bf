//! In-memory doubles for exercising the session layer without a server.

pub mod mock;
pub mod test_helpers;

pub use mock::{MockConnector, RecordedStatement, StatementKind};
pub use test_helpers::{RecordingLogger, create_test_row};

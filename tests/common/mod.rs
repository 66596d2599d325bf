#![allow(dead_code)]

use std::sync::Arc;

use mysql_middleware::config::ConnectOptions;
use mysql_middleware::test_utils::{MockConnector, RecordingLogger};
use mysql_middleware::{Database, DbError};

pub const DSN: &str = "db.test:3307/app/s3cret/shop";

pub async fn connect(mock: &MockConnector) -> Result<Database, DbError> {
    Database::open(mock.clone(), DSN, ConnectOptions::default()).await
}

pub async fn connect_logged(mock: &MockConnector) -> Result<(Database, RecordingLogger), DbError> {
    let logger = RecordingLogger::new();
    let mut db = Database::new(mock.clone()).with_logger(Arc::new(logger.clone()));
    db.connect(DSN, ConnectOptions::default()).await?;
    Ok((db, logger))
}

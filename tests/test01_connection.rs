mod common;

use mysql_middleware::config::ConnectOptions;
use mysql_middleware::dsn::Dsn;
use mysql_middleware::test_utils::{MockConnector, StatementKind};
use mysql_middleware::types::Params;
use mysql_middleware::{Database, DbError};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn open_parses_the_dsn() -> TestResult {
    let mock = MockConnector::new();
    let db = common::connect(&mock).await?;

    assert!(db.is_connected());
    assert_eq!(db.current_database(), "shop");
    assert_eq!(db.dsn().host, "db.test");
    assert_eq!(db.dsn().port, Some(3307));
    assert_eq!(mock.connections(), vec![Dsn::parse(common::DSN)]);
    assert!(mock.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn connection_errors_never_carry_the_password() {
    let mock = MockConnector::new();
    mock.refuse_connections(true);

    let err = common::connect(&mock).await.unwrap_err();
    match &err {
        DbError::ConnectionError { host, port, .. } => {
            assert_eq!(host, "db.test");
            assert_eq!(*port, 3307);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.to_string().contains("s3cret"));
}

#[tokio::test]
async fn partial_dsn_defaults_to_localhost() -> TestResult {
    let mock = MockConnector::new();
    let _db = Database::open(mock.clone(), "/app", ConnectOptions::default()).await?;
    let opened = &mock.connections()[0];
    assert_eq!(opened.host_or_default(), "localhost");
    assert_eq!(opened.port_or_default(), 3306);
    Ok(())
}

#[tokio::test]
async fn operations_require_a_connection() -> TestResult {
    let mock = MockConnector::new();
    let mut db = Database::new(mock.clone());
    assert!(matches!(
        db.execute("DELETE FROM t", &Params::new()).await,
        Err(DbError::NotConnected)
    ));

    let mut db = common::connect(&mock).await?;
    db.close();
    assert!(!db.is_connected());
    assert!(matches!(db.begin().await, Err(DbError::NotConnected)));
    Ok(())
}

#[tokio::test]
async fn timezone_is_applied_and_reapplied() -> TestResult {
    let mock = MockConnector::new();
    let options = ConnectOptions::default().with_timezone("+01:00");
    let mut db = Database::open(mock.clone(), common::DSN, options).await?;

    let recorded = mock.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].sql, "SET time_zone = :timezone");
    assert_eq!(recorded[0].kind, StatementKind::Execute);
    assert_eq!(db.current_timezone(), Some("+01:00"));

    // unchanged value: nothing sent
    mock.clear();
    assert_eq!(db.set_timezone("+01:00").await?, Some("+01:00".to_string()));
    assert!(mock.statements().is_empty());

    assert_eq!(db.set_timezone("UTC").await?, Some("+01:00".to_string()));
    assert_eq!(mock.statements(), vec!["SET time_zone = :timezone"]);
    assert_eq!(db.current_timezone(), Some("UTC"));

    // a fresh handle gets the cached timezone back
    mock.clear();
    db.connect("db.test/app/s3cret/other", ConnectOptions::default())
        .await?;
    assert_eq!(mock.statements(), vec!["SET time_zone = :timezone"]);
    Ok(())
}

#[tokio::test]
async fn connect_resets_diagnostics() -> TestResult {
    let mock = MockConnector::new();
    mock.respond("INSERT", 1, Some(9));
    let mut db = common::connect(&mock).await?;
    db.execute("INSERT INTO t (a) VALUES (:a)", &Params::new().bind("a", 1_i64))
        .await?;
    db.begin().await?;
    assert_eq!(db.last_insert_id(), Some(9));

    db.connect(common::DSN, ConnectOptions::default()).await?;
    assert_eq!(db.last_insert_id(), None);
    assert_eq!(db.last_query(), "");
    assert_eq!(db.transaction_depth(), 0);
    Ok(())
}

#[tokio::test]
async fn push_and_pop_restore_the_previous_target() -> TestResult {
    let mock = MockConnector::new();
    let options = ConnectOptions::default().with_timezone("+02:00");
    let mut db = Database::open(mock.clone(), "h1/u/p/first", options).await?;

    db.push_connection("h2/u/p/second", ConnectOptions::default())
        .await?;
    assert_eq!(db.current_database(), "second");
    assert_eq!(db.current_timezone(), Some("+02:00"));

    db.pop_connection().await?;
    assert_eq!(db.current_database(), "first");
    assert_eq!(db.dsn().host, "h1");

    let hosts: Vec<String> = mock.connections().into_iter().map(|d| d.host).collect();
    assert_eq!(hosts, vec!["h1", "h2", "h1"]);

    assert!(matches!(
        db.pop_connection().await,
        Err(DbError::ConnectionStackEmpty)
    ));
    Ok(())
}

#[tokio::test]
async fn with_connection_pops_even_on_failure() -> TestResult {
    let mock = MockConnector::new();
    mock.fail("SELECT broken", 1064, "syntax error");
    let mut db = common::connect(&mock).await?;

    let result: Result<i64, DbError> = db
        .with_connection(
            "admin.host/root/pw/mysql",
            ConnectOptions::default(),
            async |db: &mut Database| {
                assert_eq!(db.current_database(), "mysql");
                db.query_int("SELECT broken", &Params::new()).await
            },
        )
        .await;

    assert_eq!(result.unwrap_err().code(), Some(1064));
    assert_eq!(db.current_database(), "shop");
    assert_eq!(mock.connections().len(), 3);
    Ok(())
}

#[tokio::test]
async fn select_database_validates_and_switches() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    db.select_database("reports").await?;
    assert_eq!(db.current_database(), "reports");
    let recorded = mock.recorded();
    assert_eq!(recorded[0].sql, "USE `reports`");
    assert_eq!(recorded[0].kind, StatementKind::Batch);

    mock.clear();
    assert!(matches!(
        db.select_database("x`; DROP DATABASE y").await,
        Err(DbError::ParameterError(_))
    ));
    assert!(mock.statements().is_empty());
    assert_eq!(db.current_database(), "reports");
    Ok(())
}

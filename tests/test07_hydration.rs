mod common;

use mysql_middleware::database::ValueList;
use mysql_middleware::hydrate::RowMappable;
use mysql_middleware::test_utils::MockConnector;
use mysql_middleware::types::{Params, SqlValue};
use mysql_middleware::{DbError, Row, impl_from_row_serde};
use serde::Deserialize;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    email: String,
}

impl RowMappable for User {
    fn map_from_row(row: &Row) -> Result<Self, DbError> {
        Ok(User {
            id: row.try_get("id")?.to_i64(),
            email: row.try_get("email")?.to_text(),
        })
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Tag {
    id: i64,
    label: String,
}

impl_from_row_serde!(Tag);

fn mock_users() -> MockConnector {
    let mock = MockConnector::new();
    // text-protocol style values: ids arrive as strings
    mock.rows(
        "SELECT * FROM users",
        &["id", "email"],
        vec![
            vec![SqlValue::from("1"), SqlValue::from("a@x.io")],
            vec![SqlValue::from("2"), SqlValue::from("b@x.io")],
        ],
    );
    mock
}

#[tokio::test]
async fn models_map_their_own_rows() -> TestResult {
    let mock = mock_users();
    let (mut db, logger) = common::connect_logged(&mock).await?;

    let users: Vec<User> = db.query("SELECT * FROM users", &Params::new()).await?;
    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                email: "a@x.io".into()
            },
            User {
                id: 2,
                email: "b@x.io".into()
            },
        ]
    );

    // each mapped row is traced once, the inner fetch is silent
    assert_eq!(logger.count_containing("map row from"), 2);
    assert_eq!(logger.count_containing("fetch row from"), 0);
    assert!(db.query_log().is_enabled());
    Ok(())
}

#[tokio::test]
async fn generic_rows_are_traced_per_fetch() -> TestResult {
    let mock = mock_users();
    let (mut db, logger) = common::connect_logged(&mock).await?;

    let rows: Vec<Row> = db.query("SELECT * FROM users", &Params::new()).await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(logger.count_containing("fetch row from"), 2);
    assert_eq!(logger.count_containing("map row from"), 0);
    assert_eq!(logger.count_containing("SELECT * FROM users {}"), 1);
    Ok(())
}

#[tokio::test]
async fn suspended_logging_stays_quiet() -> TestResult {
    let mock = mock_users();
    let (mut db, logger) = common::connect_logged(&mock).await?;
    logger.clear();

    {
        let _quiet = db.query_log().suspend();
        let _rows: Vec<Row> = db.query("SELECT * FROM users", &Params::new()).await?;
    }
    assert!(logger.entries().is_empty());
    assert!(db.query_log().is_enabled());
    Ok(())
}

#[tokio::test]
async fn plain_types_hydrate_through_serde() -> TestResult {
    let mock = MockConnector::new();
    mock.rows(
        "SELECT id, label",
        &["id", "label"],
        vec![vec![SqlValue::Int(4), SqlValue::from("rust")]],
    );
    let mut db = common::connect(&mock).await?;

    let tag: Option<Tag> = db
        .query_one("SELECT id, label FROM tags", &Params::new())
        .await?;
    assert_eq!(
        tag,
        Some(Tag {
            id: 4,
            label: "rust".into()
        })
    );

    let json: Vec<serde_json::Value> = db
        .query("SELECT id, label FROM tags", &Params::new())
        .await?;
    assert_eq!(json, vec![serde_json::json!({"id": 4, "label": "rust"})]);
    Ok(())
}

#[tokio::test]
async fn empty_results_are_not_errors() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;
    let none = Params::new();

    let user: Option<User> = db.query_one("SELECT * FROM nobody", &none).await?;
    assert!(user.is_none());
    assert_eq!(db.query_val("SELECT 1 FROM nobody", &none).await?, SqlValue::Null);
    assert_eq!(db.query_int("SELECT 1 FROM nobody", &none).await?, 0);
    assert_eq!(db.query_string("SELECT 1 FROM nobody", &none).await?, "");
    assert_eq!(db.query_float("SELECT 1 FROM nobody", &none).await?, 0.0);
    assert!(!db.query_bool("SELECT 1 FROM nobody", &none).await?);
    Ok(())
}

#[tokio::test]
async fn scalar_helpers_coerce_the_first_column() -> TestResult {
    let mock = MockConnector::new();
    mock.rows(
        "SELECT price",
        &["price", "other"],
        vec![vec![SqlValue::from("12.50"), SqlValue::Int(1)]],
    );
    mock.rows("SELECT flag", &["flag"], vec![vec![SqlValue::Int(1)]]);
    let mut db = common::connect(&mock).await?;
    let none = Params::new();

    assert_eq!(db.query_float("SELECT price, other FROM p", &none).await?, 12.5);
    assert_eq!(db.query_int("SELECT price, other FROM p", &none).await?, 12);
    assert_eq!(
        db.query_string("SELECT price, other FROM p", &none).await?,
        "12.50"
    );
    assert!(db.query_bool("SELECT flag FROM f", &none).await?);
    Ok(())
}

#[tokio::test]
async fn lists_and_lookup_tables() -> TestResult {
    let mock = MockConnector::new();
    mock.rows(
        "SELECT code, name",
        &["code", "name"],
        vec![
            vec![SqlValue::from("de"), SqlValue::from("Germany")],
            vec![SqlValue::from("fr"), SqlValue::from("France")],
        ],
    );
    let mut db = common::connect(&mock).await?;
    let sql = "SELECT code, name FROM countries";

    let lookup = db.query_list(sql, "code", "name", &Params::new()).await?;
    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup.get("fr"), Some(&SqlValue::from("France")));

    let names = db.query_list(sql, "", "name", &Params::new()).await?;
    assert_eq!(
        names,
        ValueList::List(vec![SqlValue::from("Germany"), SqlValue::from("France")])
    );

    let by_code = db.query_assoc::<Row>(sql, "code", &Params::new()).await?;
    assert_eq!(
        by_code["de"].get("name").map(SqlValue::to_text),
        Some("Germany".to_string())
    );

    let missing = db.query_list(sql, "nope", "name", &Params::new()).await;
    assert!(matches!(missing, Err(DbError::ConversionError(_))));
    Ok(())
}

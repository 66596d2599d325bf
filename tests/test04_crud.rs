mod common;

use mysql_middleware::test_utils::MockConnector;
use mysql_middleware::types::Params;
use mysql_middleware::DbError;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn values() -> Params {
    Params::new().bind("id", 5_i64).bind("name", "x")
}

#[tokio::test]
async fn insert_returns_the_generated_id() -> TestResult {
    let mock = MockConnector::new();
    mock.respond("INSERT INTO users", 1, Some(42));
    let mut db = common::connect(&mock).await?;

    let id = db
        .insert(
            "users",
            &Params::new().bind("email", "a@b.c").bind("name", "Ann"),
        )
        .await?;
    assert_eq!(id, 42);
    assert_eq!(db.last_insert_id(), Some(42));
    assert_eq!(
        mock.statements(),
        vec!["INSERT INTO users (`email`,`name`) VALUES (:email,:name)"]
    );

    // no auto-increment: 0, and the previous id is kept
    let id = db
        .insert("audit", &Params::new().bind("event", "login"))
        .await?;
    assert_eq!(id, 0);
    assert_eq!(db.last_insert_id(), Some(42));
    Ok(())
}

#[tokio::test]
async fn insert_object_flattens_structs() -> TestResult {
    #[derive(serde::Serialize)]
    struct NewTag {
        label: String,
        weight: i32,
    }

    let mock = MockConnector::new();
    mock.respond("INSERT INTO tags", 1, Some(3));
    let mut db = common::connect(&mock).await?;

    let id = db
        .insert_object(
            "tags",
            &NewTag {
                label: "rust".into(),
                weight: 2,
            },
        )
        .await?;
    assert_eq!(id, 3);
    assert_eq!(
        mock.statements(),
        vec!["INSERT INTO tags (`label`,`weight`) VALUES (:label,:weight)"]
    );
    Ok(())
}

#[tokio::test]
async fn insert_ignore_reports_inserted_rows() -> TestResult {
    let mock = MockConnector::new();
    mock.respond("INSERT IGNORE", 0, None);
    let mut db = common::connect(&mock).await?;

    assert_eq!(db.insert_ignore("t", &values()).await?, 0);
    assert_eq!(
        mock.statements(),
        vec!["INSERT IGNORE INTO t (`id`,`name`) VALUES (:id,:name)"]
    );
    Ok(())
}

#[tokio::test]
async fn update_keeps_the_key_out_of_set() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    assert_eq!(db.update("t", "id", &values()).await?, 1);
    assert_eq!(mock.statements(), vec!["UPDATE t SET name=:name WHERE id=:id"]);

    let missing_key = db
        .update("t", "id", &Params::new().bind("name", "x"))
        .await;
    assert!(matches!(missing_key, Err(DbError::ParameterError(_))));
    Ok(())
}

#[tokio::test]
async fn delete_requires_conditions() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    db.delete("t", &Params::new().bind("id", 5_i64)).await?;
    assert_eq!(mock.statements(), vec!["DELETE FROM t WHERE id=:id"]);

    mock.clear();
    let result = db.delete("t", &Params::new()).await;
    assert!(matches!(result, Err(DbError::ParameterError(_))));
    assert!(mock.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn insert_update_builds_an_upsert() -> TestResult {
    let mock = MockConnector::new();
    mock.respond("INSERT INTO t", 2, None);
    let mut db = common::connect(&mock).await?;

    assert_eq!(db.insert_update("t", "id", &values()).await?, 2);
    assert_eq!(
        mock.statements(),
        vec![
            "INSERT INTO t (`id`,`name`) VALUES (:id,:name) \
             ON DUPLICATE KEY UPDATE `name`=VALUES(`name`)"
        ]
    );

    mock.clear();
    db.insert_update("t", "id", &Params::new().bind("id", 5_i64))
        .await?;
    assert_eq!(
        mock.statements(),
        vec!["INSERT IGNORE INTO t (`id`) VALUES (:id)"]
    );
    Ok(())
}

#[tokio::test]
async fn identifiers_are_validated_before_anything_runs() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    let bad_table = db.insert("users; DROP TABLE users", &values()).await;
    assert!(matches!(bad_table, Err(DbError::ParameterError(_))));

    let bad_column = db
        .insert("users", &Params::new().bind("name`) VALUES (1); --", "x"))
        .await;
    assert!(matches!(bad_column, Err(DbError::ParameterError(_))));

    let list_value = db
        .insert("users", &Params::new().bind("ids", vec![1_i64]))
        .await;
    assert!(matches!(list_value, Err(DbError::ParameterError(_))));

    assert!(mock.statements().is_empty());

    db.insert("archive.users", &values()).await?;
    assert_eq!(
        mock.statements(),
        vec!["INSERT INTO archive.users (`id`,`name`) VALUES (:id,:name)"]
    );
    Ok(())
}

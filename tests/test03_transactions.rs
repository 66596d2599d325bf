mod common;

use mysql_middleware::database::savepoint_name;
use mysql_middleware::test_utils::{MockConnector, StatementKind};
use mysql_middleware::types::Params;
use mysql_middleware::{Database, DbError};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn nested_commit_issues_one_begin_and_one_commit() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    db.begin().await?;
    db.begin().await?;
    assert_eq!(db.transaction_depth(), 2);
    db.commit().await?;
    assert_eq!(db.transaction_depth(), 1);
    db.commit().await?;
    assert_eq!(db.transaction_depth(), 0);

    let statements = mock.statements();
    assert_eq!(statements, vec!["BEGIN", "SAVEPOINT trans1", "COMMIT"]);
    assert_eq!(statements.iter().filter(|s| *s == "BEGIN").count(), 1);
    assert_eq!(statements.iter().filter(|s| *s == "COMMIT").count(), 1);
    assert!(
        mock.recorded()
            .iter()
            .all(|s| s.kind == StatementKind::Batch)
    );
    Ok(())
}

#[tokio::test]
async fn inner_rollback_keeps_the_outer_transaction() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    db.begin().await?;
    db.begin().await?;
    db.rollback().await?;
    assert_eq!(db.transaction_depth(), 1);
    db.commit().await?;

    assert_eq!(
        mock.statements(),
        vec![
            "BEGIN",
            "SAVEPOINT trans1",
            "ROLLBACK TO SAVEPOINT trans1",
            "COMMIT"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn rollbacks_unwind_each_level() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    for _ in 0..3 {
        db.begin().await?;
    }
    for _ in 0..3 {
        db.rollback().await?;
    }

    assert_eq!(
        mock.statements(),
        vec![
            "BEGIN",
            "SAVEPOINT trans1",
            "SAVEPOINT trans2",
            "ROLLBACK TO SAVEPOINT trans2",
            "ROLLBACK TO SAVEPOINT trans1",
            "ROLLBACK",
        ]
    );
    assert_eq!(db.transaction_depth(), 0);
    Ok(())
}

#[tokio::test]
async fn unbalanced_commit_and_rollback_fail() -> TestResult {
    let mock = MockConnector::new();
    let mut db = common::connect(&mock).await?;

    assert!(matches!(db.commit().await, Err(DbError::TransactionError(_))));
    assert!(matches!(db.rollback().await, Err(DbError::TransactionError(_))));
    assert_eq!(db.transaction_depth(), 0);
    assert!(mock.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_begin_leaves_depth_unchanged() -> TestResult {
    let mock = MockConnector::new();
    mock.fail("BEGIN", 1205, "Lock wait timeout exceeded");
    let mut db = common::connect(&mock).await?;

    let err = db.begin().await.unwrap_err();
    assert!(matches!(err, DbError::TransactionError(ref m) if m.contains("Lock wait")));
    assert_eq!(db.transaction_depth(), 0);
    Ok(())
}

#[tokio::test]
async fn transaction_helper_commits_or_rolls_back() -> TestResult {
    let mock = MockConnector::new();
    mock.fail("UPDATE missing", 1146, "Table 'shop.missing' doesn't exist");
    let mut db = common::connect(&mock).await?;

    let affected = db
        .transaction(async |db: &mut Database| {
            db.execute(
                "UPDATE accounts SET balance = 0 WHERE id = :id",
                &Params::new().bind("id", 1_i64),
            )
            .await
        })
        .await?;
    assert_eq!(affected, 1);
    assert_eq!(
        mock.statements(),
        vec![
            "BEGIN",
            "UPDATE accounts SET balance = 0 WHERE id = :id",
            "COMMIT"
        ]
    );

    mock.clear();
    let result = db
        .transaction(async |db: &mut Database| {
            db.execute("UPDATE missing SET a = 1", &Params::new()).await
        })
        .await;
    assert_eq!(result.unwrap_err().code(), Some(1146));
    assert_eq!(
        mock.statements(),
        vec!["BEGIN", "UPDATE missing SET a = 1", "ROLLBACK"]
    );
    assert_eq!(db.transaction_depth(), 0);
    Ok(())
}

#[test]
fn savepoints_are_named_by_level() {
    assert_eq!(savepoint_name(1), "trans1");
    assert_eq!(savepoint_name(12), "trans12");
}

use crate::error::DbError;
use crate::logging::LogLevel;

use super::Database;

/// Savepoint marking nesting level `level` (the depth before the matching `begin`).
#[must_use]
pub fn savepoint_name(level: u32) -> String {
    format!("trans{level}")
}

fn transaction_error(action: &str, error: DbError) -> DbError {
    match error {
        DbError::NotConnected => error,
        other => DbError::TransactionError(format!("{action} failed: {other}")),
    }
}

impl Database {
    /// Start a transaction, or a savepoint when one is already open.
    ///
    /// # Errors
    /// Returns `DbError::TransactionError` if the server rejects it; the depth is unchanged.
    pub async fn begin(&mut self) -> Result<(), DbError> {
        let sql = if self.depth == 0 {
            "BEGIN".to_string()
        } else {
            format!("SAVEPOINT {}", savepoint_name(self.depth))
        };
        self.run_raw(&sql)
            .await
            .map_err(|e| transaction_error(&sql, e))?;
        self.depth += 1;
        self.log
            .log(LogLevel::Debug, &format!("transaction depth {}", self.depth));
        Ok(())
    }

    /// Close one nesting level. Only the outermost level issues a real `COMMIT`; inner levels
    /// are folded into the enclosing transaction.
    ///
    /// # Errors
    /// Returns `DbError::TransactionError` without an open transaction or if `COMMIT` fails.
    pub async fn commit(&mut self) -> Result<(), DbError> {
        if self.depth == 0 {
            return Err(DbError::TransactionError(
                "commit without an open transaction".into(),
            ));
        }
        self.depth -= 1;
        self.log
            .log(LogLevel::Debug, &format!("transaction depth {}", self.depth));
        if self.depth == 0 {
            self.run_raw("COMMIT")
                .await
                .map_err(|e| transaction_error("COMMIT", e))?;
        }
        Ok(())
    }

    /// Undo the innermost level: back to its savepoint when nested, otherwise a real
    /// `ROLLBACK`. The enclosing transaction stays open after a nested rollback.
    ///
    /// # Errors
    /// Returns `DbError::TransactionError` without an open transaction or if the server
    /// rejects the rollback.
    pub async fn rollback(&mut self) -> Result<(), DbError> {
        if self.depth == 0 {
            return Err(DbError::TransactionError(
                "rollback without an open transaction".into(),
            ));
        }
        self.depth -= 1;
        self.log
            .log(LogLevel::Debug, &format!("transaction depth {}", self.depth));
        let sql = if self.depth > 0 {
            format!("ROLLBACK TO SAVEPOINT {}", savepoint_name(self.depth))
        } else {
            "ROLLBACK".to_string()
        };
        self.run_raw(&sql)
            .await
            .map_err(|e| transaction_error(&sql, e))
    }

    /// Run `f` inside `begin`/`commit`, rolling back if it fails.
    ///
    /// ```rust,no_run
    /// # use mysql_middleware::prelude::*;
    /// # async fn run(db: &mut Database) -> Result<(), DbError> {
    /// let debit = "UPDATE accounts SET balance = balance - 10 WHERE id = :id";
    /// let credit = "UPDATE accounts SET balance = balance + 10 WHERE id = :id";
    /// db.transaction(async |db: &mut Database| {
    ///     db.execute(debit, &Params::new().bind("id", 1_i64)).await?;
    ///     db.execute(credit, &Params::new().bind("id", 2_i64)).await
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns the error from `f` (after rolling back), or a `DbError::TransactionError`
    /// from `begin`/`commit`.
    pub async fn transaction<T, F>(&mut self, f: F) -> Result<T, DbError>
    where
        F: AsyncFnOnce(&mut Database) -> Result<T, DbError>,
    {
        self.begin().await?;
        match f(self).await {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.rollback().await {
                    self.log.log(LogLevel::Error, &rollback.to_string());
                }
                Err(e)
            }
        }
    }
}

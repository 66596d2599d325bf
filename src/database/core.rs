use crate::config::ConnectOptions;
use crate::dsn::Dsn;
use crate::error::DbError;
use crate::logging::LogLevel;
use crate::query_builder::validate_identifier;
use crate::types::Params;

use super::{Database, SavedConnection};

impl Database {
    /// Open (or replace) the native handle.
    ///
    /// Resets the last query, last insert id and transaction depth. The session timezone from
    /// `options`, or else the one previously applied on this session, is set on the new
    /// handle.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` (host and port, never the password) if the driver
    /// cannot open the handle, or a query error if the timezone cannot be applied.
    pub async fn connect(&mut self, dsn: &str, options: ConnectOptions) -> Result<(), DbError> {
        let parsed = Dsn::parse(dsn);
        // Drop the old handle first so only one is ever open.
        self.handle = None;
        let handle = self.connector.open(&parsed, &options).await.map_err(|e| {
            self.log.log(
                LogLevel::Error,
                &format!(
                    "connection to {}:{} failed",
                    parsed.host_or_default(),
                    parsed.port_or_default()
                ),
            );
            e
        })?;
        self.handle = Some(handle);
        self.log.log(
            LogLevel::Debug,
            &format!(
                "connected to {}:{}/{}",
                parsed.host_or_default(),
                parsed.port_or_default(),
                parsed.database
            ),
        );

        self.database = parsed.database.clone();
        self.dsn = parsed;
        self.last_query.clear();
        self.last_params = Params::new();
        self.last_insert_id = None;
        self.last_statement = None;
        self.depth = 0;

        let timezone = options.timezone.clone().or_else(|| self.timezone.clone());
        self.options = options;
        if let Some(timezone) = timezone {
            self.apply_timezone(&timezone).await?;
        }
        Ok(())
    }

    /// Drop the native handle. Saved connections stay on the stack.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            self.log.log(LogLevel::Debug, "connection closed");
        }
        self.depth = 0;
    }

    /// Save the current target and connect to another one.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if the new target cannot be opened; the saved
    /// target stays on the stack so a later `pop_connection` still restores it.
    pub async fn push_connection(
        &mut self,
        dsn: &str,
        options: ConnectOptions,
    ) -> Result<(), DbError> {
        self.stack.push(SavedConnection {
            dsn: self.dsn.clone(),
            options: self.options.clone(),
            timezone: self.timezone.clone(),
        });
        self.log.log(
            LogLevel::Debug,
            &format!("push connection (depth {})", self.stack.len()),
        );
        self.connect(dsn, options).await
    }

    /// Reconnect to the target saved by the matching `push_connection`.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionStackEmpty` without a matching push, or
    /// `DbError::ConnectionError` if the saved target cannot be reopened.
    pub async fn pop_connection(&mut self) -> Result<(), DbError> {
        let saved = self.stack.pop().ok_or(DbError::ConnectionStackEmpty)?;
        self.log.log(
            LogLevel::Debug,
            &format!("pop connection (depth {})", self.stack.len()),
        );
        self.timezone = saved.timezone;
        self.connect(&saved.dsn.to_string(), saved.options).await
    }

    /// Run `f` against another target, then reconnect to the current one whether `f`
    /// succeeded or not.
    ///
    /// # Errors
    /// Returns the first error from connecting, from `f`, or from restoring.
    pub async fn with_connection<T, F>(
        &mut self,
        dsn: &str,
        options: ConnectOptions,
        f: F,
    ) -> Result<T, DbError>
    where
        F: AsyncFnOnce(&mut Database) -> Result<T, DbError>,
    {
        if let Err(e) = self.push_connection(dsn, options).await {
            self.pop_connection().await?;
            return Err(e);
        }
        let result = f(self).await;
        let restored = self.pop_connection().await;
        let value = result?;
        restored?;
        Ok(value)
    }

    /// Set the session timezone, returning the previous one so callers can restore it.
    /// Nothing is sent to the server when the value is unchanged.
    ///
    /// # Errors
    /// Returns a query error if the server rejects the timezone.
    pub async fn set_timezone(&mut self, timezone: &str) -> Result<Option<String>, DbError> {
        let previous = self.timezone.clone();
        if previous.as_deref() != Some(timezone) {
            self.apply_timezone(timezone).await?;
        }
        Ok(previous)
    }

    async fn apply_timezone(&mut self, timezone: &str) -> Result<(), DbError> {
        self.execute("SET time_zone = :timezone", &Params::new().bind("timezone", timezone))
            .await?;
        self.timezone = Some(timezone.to_string());
        Ok(())
    }

    /// Switch the default database of the open handle.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` for an invalid name, or a query error from the server.
    pub async fn select_database(&mut self, database: &str) -> Result<(), DbError> {
        let database = validate_identifier(database)?;
        self.run_raw(&format!("USE `{database}`")).await?;
        self.database = database.to_string();
        Ok(())
    }
}

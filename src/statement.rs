use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::driver::{Driver, ExecOutcome};
use crate::error::DbError;
use crate::hydrate::{FromRow, Hydration};
use crate::logging::{LogLevel, QueryLog};
use crate::placeholders::referenced_names;
use crate::query_utils::count_query;
use crate::results::Row;
use crate::types::Params;

/// One prepared query: SQL text, the parameters it was last executed with, and any rows it
/// produced.
///
/// Callers are expected to over-supply parameter maps; keys whose `:name` does not occur in
/// the SQL are dropped before the driver sees them.
#[derive(Debug)]
pub struct Statement {
    sql: String,
    bound: Params,
    rows: VecDeque<Row>,
    outcome: ExecOutcome,
    log: QueryLog,
}

impl Statement {
    #[must_use]
    pub fn new(sql: impl Into<String>, log: QueryLog) -> Self {
        Self {
            sql: sql.into(),
            bound: Params::new(),
            rows: VecDeque::new(),
            outcome: ExecOutcome::default(),
            log,
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters actually bound on the last execution, after filtering.
    #[must_use]
    pub fn bound_params(&self) -> &Params {
        &self.bound
    }

    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.outcome.rows_affected
    }

    #[must_use]
    pub fn last_insert_id(&self) -> Option<u64> {
        self.outcome.last_insert_id
    }

    /// The same SQL and bound parameters without the buffered rows, for later total-row counts.
    #[must_use]
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            sql: self.sql.clone(),
            bound: self.bound.clone(),
            rows: VecDeque::new(),
            outcome: self.outcome,
            log: self.log.clone(),
        }
    }

    /// Keep only the named parameters this statement references. Positional parameters pass
    /// through untouched.
    #[must_use]
    pub fn filter_params(&self, params: &Params) -> Params {
        match params {
            Params::Named(map) => {
                let referenced = referenced_names(&self.sql);
                let kept: IndexMap<_, _> = map
                    .iter()
                    .filter(|(name, _)| referenced.contains(name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                Params::Named(kept)
            }
            Params::Positional(_) => params.clone(),
        }
    }

    fn bind(&mut self, params: &Params) {
        self.bound = self.filter_params(params);
        self.rows.clear();
        self.outcome = ExecOutcome::default();
        self.log.log(
            LogLevel::Debug,
            &format!("{} {}", self.sql, self.bound.describe()),
        );
    }

    /// Run a DML statement.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` carrying the SQL, code, and bound parameters on failure.
    pub async fn execute(
        &mut self,
        driver: &mut dyn Driver,
        params: &Params,
    ) -> Result<ExecOutcome, DbError> {
        self.bind(params);
        let outcome = driver
            .execute(&self.sql, &self.bound)
            .await
            .map_err(|e| self.wrap_error(e))?;
        self.outcome = outcome;
        Ok(outcome)
    }

    /// Run a row-returning statement and buffer its rows for fetching.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` carrying the SQL, code, and bound parameters on failure.
    pub async fn query(&mut self, driver: &mut dyn Driver, params: &Params) -> Result<(), DbError> {
        self.bind(params);
        let result_set = driver
            .query(&self.sql, &self.bound)
            .await
            .map_err(|e| self.wrap_error(e))?;
        self.outcome.rows_affected = result_set.len() as u64;
        self.rows = result_set.results.into();
        Ok(())
    }

    fn wrap_error(&self, error: DbError) -> DbError {
        match error {
            DbError::QueryError { code, message, .. } => {
                DbError::query(&self.sql, &self.bound, code, message)
            }
            DbError::ConnectionError { .. } | DbError::NotConnected => error,
            other => DbError::query(&self.sql, &self.bound, 0, other.to_string()),
        }
    }

    /// Next row as an associative map.
    pub fn fetch_assoc(&mut self) -> Option<Row> {
        let row = self.rows.pop_front()?;
        self.log
            .log(LogLevel::Debug, &format!("fetch row from: {}", self.sql));
        Some(row)
    }

    /// Next row hydrated as `T`, or `None` when the rows are exhausted.
    ///
    /// Types with [`Hydration::Mapped`] receive the raw associative row and map it themselves;
    /// the inner fetch runs with logging suspended so the row is traced once.
    ///
    /// # Errors
    /// Returns `DbError::ConversionError` if the row does not fit `T`.
    pub fn fetch_mapped_object<T: FromRow>(&mut self) -> Result<Option<T>, DbError> {
        match T::hydration() {
            Hydration::Generic => self.fetch_assoc().map(|row| T::from_row(&row)).transpose(),
            Hydration::Mapped => {
                if self.rows.is_empty() {
                    return Ok(None);
                }
                self.log
                    .log(LogLevel::Debug, &format!("map row from: {}", self.sql));
                let row = {
                    let _quiet = self.log.suspend();
                    self.fetch_assoc()
                };
                row.map(|row| T::from_row(&row)).transpose()
            }
        }
    }

    /// Hydrate every remaining row.
    ///
    /// # Errors
    /// Returns the first hydration error encountered.
    pub fn fetch_all<T: FromRow>(&mut self) -> Result<Vec<T>, DbError> {
        let mut out = Vec::with_capacity(self.rows.len());
        while let Some(item) = self.fetch_mapped_object::<T>()? {
            out.push(item);
        }
        Ok(out)
    }

    /// Rows the statement matched, ignoring its `LIMIT`: re-runs the query wrapped in
    /// `COUNT(*)` with the parameters it was last bound with. `0` for anything but `SELECT`.
    ///
    /// # Errors
    /// Returns `DbError::QueryError` if the count query fails.
    pub async fn get_total_rows(&self, driver: &mut dyn Driver) -> Result<u64, DbError> {
        let Some(count) = count_query(&self.sql, &self.bound) else {
            return Ok(0);
        };
        let mut counter = Statement::new(count.sql, self.log.clone());
        counter.query(driver, &self.bound).await?;
        Ok(counter
            .fetch_assoc()
            .and_then(|row| row.get_by_index(0).map(|v| v.to_i64()))
            .and_then(|total| u64::try_from(total).ok())
            .unwrap_or_default())
    }
}

//! Helper utilities for testing and development.

use std::sync::{Arc, Mutex, PoisonError};

use crate::logging::{LogLevel, QueryLogger};
use crate::results::Row;
use crate::types::SqlValue;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<SqlValue>) -> Row {
    Row::new(Arc::new(column_names), values)
}

/// A `QueryLogger` that keeps every entry for later assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl RecordingLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, message)| message).collect()
    }

    /// Entries whose message contains `needle`.
    #[must_use]
    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl QueryLogger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

use std::collections::BTreeMap;

use serde::Deserialize;

/// Charset applied to every new connection (4-byte UTF-8).
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// Options applied when a connection is opened.
///
/// Deserializable so it can live next to the rest of an application's configuration:
/// ```rust
/// use mysql_middleware::config::ConnectOptions;
///
/// let options: ConnectOptions =
///     serde_json::from_str(r#"{ "timezone": "+00:00", "init_statements": ["SET sql_mode = ''"] }"#)
///         .unwrap();
/// assert_eq!(options.charset, "utf8mb4");
/// assert_eq!(options.timezone.as_deref(), Some("+00:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    pub charset: String,
    /// Session timezone to apply right after connecting.
    pub timezone: Option<String>,
    /// Statements run once on every new connection, after the charset is set.
    pub init_statements: Vec<String>,
    /// Driver-specific attributes, passed through untouched.
    pub attributes: BTreeMap<String, String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.to_string(),
            timezone: None,
            init_statements: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }
}

impl ConnectOptions {
    #[must_use]
    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = Some(timezone.to_string());
        self
    }

    #[must_use]
    pub fn with_init_statement(mut self, sql: &str) -> Self {
        self.init_statements.push(sql.to_string());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Statements a driver runs on a fresh handle: charset first, then caller extras.
    #[must_use]
    pub fn session_init_statements(&self) -> Vec<String> {
        let mut statements = Vec::with_capacity(self.init_statements.len() + 1);
        statements.push(format!("SET NAMES {}", self.charset));
        statements.extend(self.init_statements.iter().cloned());
        statements
    }
}

//! Compact connection strings: `host[:port]/user/pass/dbname`.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::DbError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;

/// Parsed form of a DSN string.
///
/// Parsing is lenient: missing fields come back empty so a partial DSN still connects to
/// `localhost`. `Display` is the exact inverse of `FromStr` for well-formed input.
///
/// ```rust
/// use mysql_middleware::dsn::Dsn;
///
/// let dsn: Dsn = "db.internal:3307/app/secret/orders".parse().unwrap();
/// assert_eq!(dsn.host, "db.internal");
/// assert_eq!(dsn.port, Some(3307));
/// assert_eq!(dsn.to_string(), "db.internal:3307/app/secret/orders");
/// ```
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Dsn {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Dsn {
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.trim().split('/').collect();

        let (host, port) = split_host_port(parts.first().copied().unwrap_or_default());
        let user = parts.get(1).copied().unwrap_or_default();
        // The password sits between user and database; a password containing '/' keeps its
        // slashes as long as the database name itself has none.
        let (password, database) = match parts.len() {
            0..=2 => (String::new(), ""),
            3 => (parts[2].to_string(), ""),
            n => (parts[2..n - 1].join("/"), parts[n - 1]),
        };

        Dsn {
            host: host.to_string(),
            port,
            user: user.to_string(),
            password,
            database: database.to_string(),
        }
    }

    /// Read a DSN from an environment variable.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` if the variable is unset or not valid unicode.
    pub fn from_env(var: &str) -> Result<Self, DbError> {
        std::env::var(var)
            .map(|raw| Dsn::parse(&raw))
            .map_err(|e| DbError::ConfigError(format!("{var}: {e}")))
    }

    /// Host to dial; an empty host means `localhost`.
    #[must_use]
    pub fn host_or_default(&self) -> &str {
        if self.host.is_empty() {
            DEFAULT_HOST
        } else {
            &self.host
        }
    }

    #[must_use]
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    #[must_use]
    pub fn with_database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }
}

fn split_host_port(raw: &str) -> (&str, Option<u16>) {
    match raw.rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(port) => (host, Some(port)),
            Err(_) => (raw, None),
        },
        None => (raw, None),
    }
}

impl FromStr for Dsn {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Dsn::parse(s))
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "/{}/{}/{}", self.user, self.password, self.database)
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dsn")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::DbError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Values that can be stored in a database row or used as query parameters.
///
/// ```rust
/// use mysql_middleware::prelude::*;
///
/// let params = Params::new()
///     .bind("id", 1)
///     .bind("name", "alice")
///     .bind("active", true);
/// assert_eq!(params.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlValue {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let SqlValue::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let SqlValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let SqlValue::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let SqlValue::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let SqlValue::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let SqlValue::JSON(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let SqlValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Coerce to an integer; anything that does not parse becomes `0`.
    #[must_use]
    pub fn to_i64(&self) -> i64 {
        match self {
            SqlValue::Int(i) => *i,
            #[allow(clippy::cast_possible_truncation)]
            SqlValue::Float(f) => *f as i64,
            SqlValue::Bool(b) => i64::from(*b),
            SqlValue::Text(s) => parse_leading_int(s),
            SqlValue::Blob(bytes) => parse_leading_int(&String::from_utf8_lossy(bytes)),
            SqlValue::JSON(v) => v.as_i64().unwrap_or_default(),
            SqlValue::Timestamp(dt) => dt.and_utc().timestamp(),
            SqlValue::Null => 0,
        }
    }

    /// Coerce to a float; anything that does not parse becomes `0.0`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(i) => *i as f64,
            SqlValue::Float(f) => *f,
            SqlValue::Bool(b) => f64::from(u8::from(*b)),
            SqlValue::Text(s) => s.trim().parse().unwrap_or_default(),
            SqlValue::Blob(bytes) => String::from_utf8_lossy(bytes)
                .trim()
                .parse()
                .unwrap_or_default(),
            SqlValue::JSON(v) => v.as_f64().unwrap_or_default(),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Timestamp(dt) => dt.and_utc().timestamp() as f64,
            SqlValue::Null => 0.0,
        }
    }

    /// Coerce to a boolean: zero, empty, `"0"` and NULL are false.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        match self {
            SqlValue::Bool(b) => *b,
            SqlValue::Int(i) => *i != 0,
            SqlValue::Float(f) => *f != 0.0,
            SqlValue::Text(s) => !(s.is_empty() || s == "0"),
            SqlValue::Blob(bytes) => !(bytes.is_empty() || bytes.as_slice() == b"0"),
            SqlValue::JSON(v) => !v.is_null(),
            SqlValue::Timestamp(_) => true,
            SqlValue::Null => false,
        }
    }

    /// Render the value the way a text column would hold it. NULL becomes the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            SqlValue::Text(s) => s.clone(),
            SqlValue::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Convert a JSON scalar into a value; objects and nested arrays stay JSON.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => SqlValue::Null,
            JsonValue::Bool(b) => SqlValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => SqlValue::Float(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => SqlValue::Text(s),
            other => SqlValue::JSON(other),
        }
    }

    /// Convert into a JSON value for serde-based hydration.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            SqlValue::Int(i) => JsonValue::from(*i),
            SqlValue::Float(f) => JsonValue::from(*f),
            SqlValue::Text(s) => JsonValue::String(s.clone()),
            SqlValue::Bool(b) => JsonValue::Bool(*b),
            SqlValue::Timestamp(dt) => JsonValue::String(dt.format(TIMESTAMP_FORMAT).to_string()),
            SqlValue::Null => JsonValue::Null,
            SqlValue::JSON(v) => v.clone(),
            SqlValue::Blob(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return i;
    }
    #[allow(clippy::cast_possible_truncation)]
    trimmed.parse::<f64>().map(|f| f as i64).unwrap_or_default()
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(s) => write!(f, "{s}"),
            SqlValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            SqlValue::Timestamp(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::JSON(v) => write!(f, "{v}"),
            SqlValue::Blob(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

macro_rules! impl_from_for_sql_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_sql_value! {
    i64 => Int,
    i32 => Int,
    i16 => Int,
    u32 => Int,
    u16 => Int,
    u8 => Int,
    f64 => Float,
    f32 => Float,
    bool => Bool,
    String => Text,
    &str => Text,
    NaiveDateTime => Timestamp,
    JsonValue => JSON,
    Vec<u8> => Blob,
}

/// Ids above `i64::MAX` are kept exactly as text.
impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| SqlValue::Text(value.to_string()), SqlValue::Int)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// A single bound parameter: either a scalar or a sequence that gets exploded into a
/// placeholder list before execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(SqlValue),
    List(Vec<SqlValue>),
}

impl ParamValue {
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, ParamValue::List(_))
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<&SqlValue> {
        match self {
            ParamValue::Scalar(v) => Some(v),
            ParamValue::List(_) => None,
        }
    }
}

macro_rules! impl_from_for_param_value {
    (scalars: $($scalar:ty),* ; lists: $($item:ty),* $(,)?) => {
        $(
            impl From<$scalar> for ParamValue {
                fn from(value: $scalar) -> Self {
                    ParamValue::Scalar(value.into())
                }
            }

            impl From<Option<$scalar>> for ParamValue {
                fn from(value: Option<$scalar>) -> Self {
                    ParamValue::Scalar(value.into())
                }
            }
        )*
        $(
            impl From<Vec<$item>> for ParamValue {
                fn from(values: Vec<$item>) -> Self {
                    ParamValue::List(values.into_iter().map(Into::into).collect())
                }
            }
        )*
    };
}

// `Vec<u8>` stays a blob scalar; it is deliberately absent from the list types.
impl_from_for_param_value! {
    scalars: i64, i32, i16, u64, u32, u16, u8, f64, f32, bool, String, &str, NaiveDateTime,
        JsonValue, SqlValue, Vec<u8>;
    lists: i64, i32, i16, u64, u32, u16, f64, f32, bool, String, &str, NaiveDateTime, SqlValue,
}

/// Parameters for a statement.
///
/// Named parameters keep insertion order, which makes generated SQL deterministic.
/// Positional parameters are passed through to the driver untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Named(IndexMap<String, ParamValue>),
    Positional(Vec<SqlValue>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Named(IndexMap::new())
    }
}

impl Params {
    /// Empty named parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn positional(values: Vec<SqlValue>) -> Self {
        Params::Positional(values)
    }

    /// Add a named parameter, builder style. Binding onto a positional set appends the value.
    #[must_use]
    pub fn bind(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a named parameter.
    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        let name = name.trim_start_matches(':');
        match self {
            Params::Named(map) => {
                map.insert(name.to_string(), value.into());
            }
            Params::Positional(values) => {
                if let ParamValue::Scalar(v) = value.into() {
                    values.push(v);
                }
            }
        }
    }

    /// Flatten a serializable struct or map into named parameters. Top-level arrays become
    /// list parameters; nested objects are bound as JSON.
    ///
    /// # Errors
    /// Returns `DbError::ParameterError` if the value does not serialize to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, DbError> {
        let json = serde_json::to_value(value)
            .map_err(|e| DbError::ParameterError(format!("cannot flatten parameters: {e}")))?;
        let JsonValue::Object(fields) = json else {
            return Err(DbError::ParameterError(
                "parameters must serialize to an object".into(),
            ));
        };
        let mut map = IndexMap::with_capacity(fields.len());
        for (name, field) in fields {
            let param = match field {
                JsonValue::Array(items) => {
                    ParamValue::List(items.into_iter().map(SqlValue::from_json).collect())
                }
                other => ParamValue::Scalar(SqlValue::from_json(other)),
            };
            map.insert(name, param);
        }
        Ok(Params::Named(map))
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, Params::Named(_))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Params::Named(map) => map.len(),
            Params::Positional(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        match self {
            Params::Named(map) => map.get(name.trim_start_matches(':')),
            Params::Positional(_) => None,
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Named parameter keys, in insertion order. Empty for positional parameters.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let names: Vec<&str> = match self {
            Params::Named(map) => map.keys().map(String::as_str).collect(),
            Params::Positional(_) => Vec::new(),
        };
        names.into_iter()
    }

    /// Short rendering for diagnostics and error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Params::Named(map) => {
                let parts: Vec<String> = map
                    .iter()
                    .map(|(k, v)| match v {
                        ParamValue::Scalar(value) => format!(":{k}={value}"),
                        ParamValue::List(values) => format!(":{k}=[{} items]", values.len()),
                    })
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Params::Positional(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

impl From<IndexMap<String, ParamValue>> for Params {
    fn from(map: IndexMap<String, ParamValue>) -> Self {
        Params::Named(map)
    }
}

impl From<Vec<SqlValue>> for Params {
    fn from(values: Vec<SqlValue>) -> Self {
        Params::Positional(values)
    }
}

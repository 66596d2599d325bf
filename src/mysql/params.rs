use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime, Timelike};
use mysql_async::{Params as MySqlParams, Value};

use crate::error::DbError;
use crate::types::{ParamValue, Params, SqlValue};

/// Convert expanded parameters into native ones.
///
/// # Errors
/// Returns `DbError::ParameterError` if a list value survived expansion.
pub fn convert(params: &Params) -> Result<MySqlParams, DbError> {
    match params {
        Params::Named(map) if map.is_empty() => Ok(MySqlParams::Empty),
        Params::Named(map) => {
            let mut named = HashMap::with_capacity(map.len());
            for (name, value) in map {
                let ParamValue::Scalar(value) = value else {
                    return Err(DbError::ParameterError(format!(
                        "list parameter ':{name}' was not expanded"
                    )));
                };
                named.insert(name.as_bytes().to_vec(), to_mysql_value(value));
            }
            Ok(MySqlParams::Named(named))
        }
        Params::Positional(values) if values.is_empty() => Ok(MySqlParams::Empty),
        Params::Positional(values) => Ok(MySqlParams::Positional(
            values.iter().map(to_mysql_value).collect(),
        )),
    }
}

#[must_use]
pub fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(i) => Value::Int(*i),
        SqlValue::Float(f) => Value::Double(*f),
        SqlValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
        SqlValue::Bool(b) => Value::Int(i64::from(*b)),
        SqlValue::Timestamp(dt) => timestamp_value(dt),
        SqlValue::Null => Value::NULL,
        SqlValue::JSON(json) => Value::Bytes(json.to_string().into_bytes()),
        SqlValue::Blob(bytes) => Value::Bytes(bytes.clone()),
    }
}

// chrono keeps every component in range for the narrowing below.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timestamp_value(dt: &NaiveDateTime) -> Value {
    Value::Date(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
        dt.nanosecond() / 1_000,
    )
}

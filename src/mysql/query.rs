use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Row as MySqlRow, Value};

use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::{Params, SqlValue};

/// Collation id of the `binary` character set.
const BINARY_CHARSET: u16 = 63;

/// Build a result set from native rows.
#[must_use]
pub fn build_result_set(rows: Vec<MySqlRow>) -> ResultSet {
    let mut result_set = ResultSet::with_capacity(rows.len());
    if let Some(row) = rows.first() {
        let names: Vec<String> = row
            .columns_ref()
            .iter()
            .map(|c| c.name_str().into_owned())
            .collect();
        result_set.set_column_names(Arc::new(names));
    }

    for row in rows {
        let values = row
            .columns_ref()
            .iter()
            .enumerate()
            .map(|(i, column)| extract_value(row.as_ref(i), column))
            .collect();
        result_set.add_row_values(values);
    }
    result_set
}

/// Convert one native value, using the column metadata to decide how text-protocol bytes
/// are read.
#[must_use]
pub fn extract_value(value: Option<&Value>, column: &Column) -> SqlValue {
    match value {
        None | Some(Value::NULL) => SqlValue::Null,
        Some(Value::Int(i)) => SqlValue::Int(*i),
        Some(Value::UInt(u)) => {
            i64::try_from(*u).map_or_else(|_| SqlValue::Text(u.to_string()), SqlValue::Int)
        }
        Some(Value::Float(f)) => SqlValue::Float(f64::from(*f)),
        Some(Value::Double(d)) => SqlValue::Float(*d),
        Some(Value::Date(year, month, day, hour, minute, second, micros)) => {
            NaiveDate::from_ymd_opt(i32::from(*year), u32::from(*month), u32::from(*day))
                .and_then(|date| {
                    date.and_hms_micro_opt(
                        u32::from(*hour),
                        u32::from(*minute),
                        u32::from(*second),
                        *micros,
                    )
                })
                .map_or_else(
                    // zero dates have no chrono representation
                    || {
                        SqlValue::Text(format!(
                            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                        ))
                    },
                    SqlValue::Timestamp,
                )
        }
        Some(Value::Time(negative, days, hours, minutes, seconds, micros)) => {
            let sign = if *negative { "-" } else { "" };
            let hours = days * 24 + u32::from(*hours);
            let mut text = format!("{sign}{hours:02}:{minutes:02}:{seconds:02}");
            if *micros != 0 {
                text.push_str(&format!(".{micros:06}"));
            }
            SqlValue::Text(text)
        }
        Some(Value::Bytes(bytes)) => bytes_value(bytes, column),
    }
}

fn bytes_value(bytes: &[u8], column: &Column) -> SqlValue {
    let text = std::str::from_utf8(bytes);
    match (column.column_type(), text) {
        (
            ColumnType::MYSQL_TYPE_TINY
            | ColumnType::MYSQL_TYPE_SHORT
            | ColumnType::MYSQL_TYPE_LONG
            | ColumnType::MYSQL_TYPE_INT24
            | ColumnType::MYSQL_TYPE_LONGLONG
            | ColumnType::MYSQL_TYPE_YEAR,
            Ok(text),
        ) => text
            .parse()
            .map_or_else(|_| SqlValue::Text(text.to_string()), SqlValue::Int),
        (ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE, Ok(text)) => text
            .parse()
            .map_or_else(|_| SqlValue::Text(text.to_string()), SqlValue::Float),
        (ColumnType::MYSQL_TYPE_JSON, Ok(text)) => serde_json::from_str(text)
            .map_or_else(|_| SqlValue::Text(text.to_string()), SqlValue::JSON),
        (
            ColumnType::MYSQL_TYPE_DATETIME
            | ColumnType::MYSQL_TYPE_DATETIME2
            | ColumnType::MYSQL_TYPE_TIMESTAMP
            | ColumnType::MYSQL_TYPE_TIMESTAMP2
            | ColumnType::MYSQL_TYPE_DATE
            | ColumnType::MYSQL_TYPE_NEWDATE,
            Ok(text),
        ) => parse_datetime(text)
            .map_or_else(|| SqlValue::Text(text.to_string()), SqlValue::Timestamp),
        (_, Ok(text)) if column.character_set() != BINARY_CHARSET => {
            SqlValue::Text(text.to_string())
        }
        _ => SqlValue::Blob(bytes.to_vec()),
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Wrap a native failure for `sql`, keeping the server error code when there is one.
#[must_use]
pub fn query_error(sql: &str, params: &Params, error: mysql_async::Error) -> DbError {
    match error {
        mysql_async::Error::Server(server) => {
            DbError::query(sql, params, server.code, server.message)
        }
        other => DbError::query(sql, params, 0, other.to_string()),
    }
}

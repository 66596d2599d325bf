//! Column metadata normalised from `DESCRIBE` output.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::DbError;
use crate::results::Row;

static NATIVE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z]+)(?:\((?P<length>.*)\))?\s*(?P<modifiers>.*)$")
        .expect("column type pattern is valid")
});

/// Logical type a column maps to, independent of its exact native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    String,
    Int,
    Float,
    Bool,
    Date,
    Json,
    Unknown,
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalType::String => "string",
            LogicalType::Int => "int",
            LogicalType::Float => "float",
            LogicalType::Bool => "bool",
            LogicalType::Date => "date",
            LogicalType::Json => "json",
            LogicalType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl LogicalType {
    /// Fixed lookup from a lowercase native base type.
    #[must_use]
    pub fn from_native(base: &str) -> Self {
        match base {
            "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum"
            | "set" | "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob"
            | "longblob" => LogicalType::String,
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "year"
            | "bit" => LogicalType::Int,
            "float" | "double" | "real" | "decimal" | "numeric" | "dec" | "fixed" => {
                LogicalType::Float
            }
            "bool" | "boolean" => LogicalType::Bool,
            "date" | "datetime" | "timestamp" | "time" => LogicalType::Date,
            "json" => LogicalType::Json,
            _ => LogicalType::Unknown,
        }
    }
}

/// Native type string split as `name(length)modifiers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    pub name: String,
    pub length: Option<String>,
    pub modifiers: String,
}

impl NativeType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match NATIVE_TYPE.captures(trimmed) {
            Some(caps) => NativeType {
                name: caps
                    .name("name")
                    .map_or_else(String::new, |m| m.as_str().to_ascii_lowercase()),
                length: caps
                    .name("length")
                    .map(|m| m.as_str().to_string())
                    .filter(|s| !s.is_empty()),
                modifiers: caps
                    .name("modifiers")
                    .map_or_else(String::new, |m| m.as_str().trim().to_ascii_lowercase()),
            },
            None => NativeType {
                name: trimmed.to_ascii_lowercase(),
                length: None,
                modifiers: String::new(),
            },
        }
    }
}

/// One column of a table, as reported by `DESCRIBE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Raw field name, e.g. `created_at`.
    pub field: String,
    /// camelCase property name, e.g. `createdAt`.
    pub property: String,
    /// Full native type as reported, e.g. `int(10) unsigned`.
    pub raw_type: String,
    /// Lowercase native base type, e.g. `int`.
    pub native_type: String,
    /// Declared length/precision or enum member list, verbatim.
    pub length: Option<String>,
    pub modifiers: String,
    pub nullable: bool,
    pub logical_type: LogicalType,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub extra: String,
}

impl ColumnDescriptor {
    /// Build a descriptor from raw `DESCRIBE` fields.
    #[must_use]
    pub fn new(
        field: &str,
        raw_type: &str,
        nullable: bool,
        key: &str,
        default: Option<String>,
        extra: &str,
    ) -> Self {
        let native = NativeType::parse(raw_type);
        let logical_type = if field.starts_with("json_") {
            LogicalType::Json
        } else if native.name == "tinyint" && native.length.as_deref() == Some("1") {
            LogicalType::Bool
        } else {
            LogicalType::from_native(&native.name)
        };
        let key = key.trim().to_ascii_uppercase();

        ColumnDescriptor {
            field: field.to_string(),
            property: camel_case(field),
            raw_type: raw_type.to_string(),
            native_type: native.name,
            length: native.length,
            modifiers: native.modifiers,
            nullable,
            logical_type,
            primary_key: key == "PRI",
            unique: key == "UNI",
            default,
            extra: extra.to_string(),
        }
    }

    /// Build a descriptor from one `DESCRIBE` row (`Field`, `Type`, `Null`, `Key`, `Default`,
    /// `Extra`).
    ///
    /// # Errors
    /// Returns `DbError::ConversionError` if `Field` or `Type` is missing.
    pub fn from_describe_row(row: &Row) -> Result<Self, DbError> {
        let text = |name: &str| row.get(name).map(|v| v.to_text()).unwrap_or_default();
        let field = row.try_get("Field")?.to_text();
        let raw_type = row.try_get("Type")?.to_text();
        let default = row
            .get("Default")
            .filter(|v| !v.is_null())
            .map(|v| v.to_text());
        Ok(ColumnDescriptor::new(
            &field,
            &raw_type,
            text("Null").eq_ignore_ascii_case("YES"),
            &text("Key"),
            default,
            &text("Extra"),
        ))
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Primary keys are unique too.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique || self.primary_key
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.logical_type, LogicalType::Int | LogicalType::Float)
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        self.logical_type == LogicalType::String
    }

    #[must_use]
    pub fn is_datetime(&self) -> bool {
        self.logical_type == LogicalType::Date
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.logical_type == LogicalType::Bool
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.logical_type == LogicalType::Json
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.native_type == "enum"
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.native_type == "set"
    }

    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.modifiers.split_whitespace().any(|m| m == "unsigned")
    }

    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }

    /// Declared length for simple `name(n)` types; `None` for enums, sets and precision pairs.
    #[must_use]
    pub fn max_length(&self) -> Option<u32> {
        self.length.as_deref().and_then(|l| l.trim().parse().ok())
    }

    /// Members of an `enum(...)` or `set(...)` column.
    #[must_use]
    pub fn enum_values(&self) -> Vec<String> {
        if !(self.is_enum() || self.is_set()) {
            return Vec::new();
        }
        self.length.as_deref().map(split_quoted_list).unwrap_or_default()
    }
}

/// `'a','b,c','it''s'` -> `["a", "b,c", "it's"]`
fn split_quoted_list(list: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = list.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, in_quote) {
            ('\'', true) if chars.peek() == Some(&'\'') => {
                current.push('\'');
                chars.next();
            }
            ('\'', _) => in_quote = !in_quote,
            (',', false) => values.push(std::mem::take(&mut current)),
            (_, true) => current.push(c),
            _ => {}
        }
    }
    if !current.is_empty() || !values.is_empty() {
        values.push(current);
    }
    values
}

/// `snake_case` -> `camelCase`.
#[must_use]
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for (i, segment) in field.split('_').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

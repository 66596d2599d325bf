//! Turning raw rows into typed values.

use serde_json::Value as JsonValue;

use crate::error::DbError;
use crate::results::Row;

/// How a target type wants its rows delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Generic hydration: the row is converted as-is.
    Generic,
    /// The type maps the raw associative row itself (applying its own coercions).
    Mapped,
}

/// Anything a query can hydrate rows into.
pub trait FromRow: Sized {
    /// # Errors
    /// Returns `DbError::ConversionError` when the row does not fit.
    fn from_row(row: &Row) -> Result<Self, DbError>;

    fn hydration() -> Hydration {
        Hydration::Generic
    }
}

/// Domain models that map a raw row into themselves, e.g. parsing integer strings or
/// timestamps that generic hydration would leave untouched.
///
/// ```rust
/// use mysql_middleware::prelude::*;
///
/// struct User {
///     id: i64,
///     email: String,
/// }
///
/// impl RowMappable for User {
///     fn map_from_row(row: &Row) -> Result<Self, DbError> {
///         Ok(User {
///             id: row.try_get("id")?.to_i64(),
///             email: row.try_get("email")?.to_text(),
///         })
///     }
/// }
///
/// let row = Row::from_pairs([("id", SqlValue::from("12")), ("email", SqlValue::from("a@b.c"))]);
/// let user = User::from_row(&row).unwrap();
/// assert_eq!(user.id, 12);
/// ```
pub trait RowMappable: Sized {
    /// # Errors
    /// Returns `DbError::ConversionError` when the row does not fit the model.
    fn map_from_row(row: &Row) -> Result<Self, DbError>;
}

impl<T: RowMappable> FromRow for T {
    fn from_row(row: &Row) -> Result<Self, DbError> {
        T::map_from_row(row)
    }

    fn hydration() -> Hydration {
        Hydration::Mapped
    }
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(row.clone())
    }
}

impl FromRow for JsonValue {
    fn from_row(row: &Row) -> Result<Self, DbError> {
        Ok(row.to_json())
    }
}

/// Implement [`FromRow`] for plain value objects through their serde `Deserialize` impl.
///
/// ```rust
/// use mysql_middleware::impl_from_row_serde;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl_from_row_serde!(Tag);
/// ```
#[macro_export]
macro_rules! impl_from_row_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::hydrate::FromRow for $ty {
                fn from_row(row: &$crate::results::Row) -> Result<Self, $crate::error::DbError> {
                    row.deserialize()
                }
            }
        )+
    };
}

//! Driver-neutral SQL values and result rows.

use courses_core::{CoursesError, CoursesResult};
use std::fmt;

/// A single bindable or fetched SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns true for SQL NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name used in mapping errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Bool(_) => "BOOLEAN",
            Self::Bytes(_) => "BLOB",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One fetched row: column names paired with values, in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    columns: Vec<(String, SqlValue)>,
}

impl ResultRow {
    /// Builds a row from (column, value) pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over (column, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Raw value of a column.
    ///
    /// # Errors
    ///
    /// Returns a data-mapping error if the row has no such column.
    pub fn get(&self, column: &str) -> CoursesResult<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| CoursesError::data_mapping(format!("row has no column '{column}'")))
    }

    /// Nullable integer column.
    pub fn get_opt_i64(&self, column: &str) -> CoursesResult<Option<i64>> {
        self.typed(column, "INTEGER", |value| match value {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Bool(v) => Some(i64::from(*v)),
            _ => None,
        })
    }

    /// Non-null integer column.
    pub fn get_i64(&self, column: &str) -> CoursesResult<i64> {
        required(column, self.get_opt_i64(column)?)
    }

    /// Nullable floating-point column. Integers widen.
    pub fn get_opt_f64(&self, column: &str) -> CoursesResult<Option<f64>> {
        self.typed(column, "REAL", |value| match value {
            SqlValue::Real(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Integer(v) => Some(*v as f64),
            _ => None,
        })
    }

    /// Non-null floating-point column.
    pub fn get_f64(&self, column: &str) -> CoursesResult<f64> {
        required(column, self.get_opt_f64(column)?)
    }

    /// Nullable text column.
    pub fn get_opt_string(&self, column: &str) -> CoursesResult<Option<String>> {
        self.typed(column, "TEXT", |value| match value {
            SqlValue::Text(v) => Some(v.clone()),
            _ => None,
        })
    }

    /// Non-null text column.
    pub fn get_string(&self, column: &str) -> CoursesResult<String> {
        required(column, self.get_opt_string(column)?)
    }

    /// Nullable boolean column. SQLite stores booleans as 0/1 integers.
    pub fn get_opt_bool(&self, column: &str) -> CoursesResult<Option<bool>> {
        self.typed(column, "BOOLEAN", |value| match value {
            SqlValue::Bool(v) => Some(*v),
            SqlValue::Integer(v) => Some(*v != 0),
            _ => None,
        })
    }

    /// Non-null boolean column.
    pub fn get_bool(&self, column: &str) -> CoursesResult<bool> {
        required(column, self.get_opt_bool(column)?)
    }

    /// Nullable blob column.
    pub fn get_opt_bytes(&self, column: &str) -> CoursesResult<Option<Vec<u8>>> {
        self.typed(column, "BLOB", |value| match value {
            SqlValue::Bytes(v) => Some(v.clone()),
            _ => None,
        })
    }

    fn typed<T>(
        &self,
        column: &str,
        expected: &str,
        convert: impl FnOnce(&SqlValue) -> Option<T>,
    ) -> CoursesResult<Option<T>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        convert(value).map(Some).ok_or_else(|| {
            CoursesError::data_mapping(format!(
                "column '{column}' holds {} where {expected} was expected",
                value.type_name()
            ))
        })
    }
}

fn required<T>(column: &str, value: Option<T>) -> CoursesResult<T> {
    value.ok_or_else(|| CoursesError::data_mapping(format!("column '{column}' is NULL")))
}

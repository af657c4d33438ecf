//! Equality filters used to select rows.

use crate::table::TableAttr;
use crate::value::SqlValue;
use std::fmt;

/// An ordered conjunction of `attribute = value` predicates.
///
/// Order only matters for parameter binding. A `Null` value matches rows
/// where the column `IS NULL`. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<(String, SqlValue)>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate, builder style.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(attribute, value);
        self
    }

    /// Adds a predicate.
    pub fn push(&mut self, attribute: impl Into<String>, value: impl Into<SqlValue>) {
        self.predicates.push((attribute.into(), value.into()));
    }

    /// Predicates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.predicates.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Attribute names referenced by the filter.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(|(name, _)| name.as_str())
    }

    /// Values that need a placeholder, in binding order.
    #[must_use]
    pub fn bound_values(&self) -> Vec<SqlValue> {
        self.predicates
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether the filter selects everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return f.write_str("<all rows>");
        }
        for (index, (name, value)) in self.predicates.iter().enumerate() {
            if index > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

/// Returns true when every attribute the filter names is in `allowable`.
#[must_use]
pub fn validate_filter(filter: &Filter, allowable: &[TableAttr]) -> bool {
    filter
        .attribute_names()
        .all(|name| allowable.iter().any(|attr| attr.name() == name))
}

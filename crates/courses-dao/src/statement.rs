//! Parameterized SQL generation for single-table operations.
//!
//! Every generator is a pure function of the schema (and filter or column
//! set). Placeholders are positional `?`, accepted by SQLite and MySQL.
//! Identifiers are not quoted; [`TableSchema`] only admits plain identifiers.

use crate::filter::Filter;
use crate::table::{TableAttr, TableSchema};
use crate::value::SqlValue;
use courses_core::{CoursesError, CoursesResult};
use std::fmt;
use std::sync::Arc;

/// SQL text plus the number of placeholders it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: Arc<str>,
    param_count: usize,
}

impl Statement {
    pub(crate) fn new(sql: String, param_count: usize) -> Self {
        Self {
            sql: sql.into(),
            param_count,
        }
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of `?` placeholders.
    #[must_use]
    pub const fn param_count(&self) -> usize {
        self.param_count
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// A statement with one full parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    statement: Statement,
    params: Vec<SqlValue>,
}

impl BoundStatement {
    /// Pairs a statement with its parameters.
    ///
    /// # Errors
    ///
    /// Returns a data-mapping error when the parameter count differs from
    /// the placeholders the statement declares.
    pub fn new(statement: Statement, params: Vec<SqlValue>) -> CoursesResult<Self> {
        if params.len() != statement.param_count() {
            return Err(CoursesError::data_mapping(format!(
                "statement `{statement}` declares {} parameters but {} were bound",
                statement.param_count(),
                params.len()
            )));
        }
        Ok(Self { statement, params })
    }

    /// The statement.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    /// Bound parameters, in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

fn column_list(attributes: &[TableAttr]) -> String {
    attributes
        .iter()
        .map(TableAttr::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT INTO t (a, b, c) VALUES (?, ?, ?)` over every attribute.
#[must_use]
pub fn insert(schema: &TableSchema) -> Statement {
    let attributes = schema.attributes();
    let placeholders = vec!["?"; attributes.len()].join(", ");
    Statement::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            schema.name(),
            column_list(attributes)
        ),
        attributes.len(),
    )
}

/// `DELETE FROM t WHERE id = ?`
#[must_use]
pub fn delete_by_id(schema: &TableSchema) -> Statement {
    Statement::new(
        format!(
            "DELETE FROM {} WHERE {} = ?",
            schema.name(),
            schema.identity().name()
        ),
        1,
    )
}

/// `SELECT a, b, c FROM t [WHERE x = ? AND y IS NULL ...]`
///
/// Only non-null predicates take a placeholder; bind
/// [`Filter::bound_values`] in order.
#[must_use]
pub fn select_by_filter(schema: &TableSchema, filter: &Filter) -> Statement {
    let mut sql = format!(
        "SELECT {} FROM {}",
        column_list(schema.attributes()),
        schema.name()
    );
    let mut param_count = 0;

    let predicates: Vec<String> = filter
        .iter()
        .map(|(name, value)| {
            if value.is_null() {
                format!("{name} IS NULL")
            } else {
                param_count += 1;
                format!("{name} = ?")
            }
        })
        .collect();

    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    Statement::new(sql, param_count)
}

/// `UPDATE t SET a = ?, b = ? WHERE id = ?`
///
/// The identity placeholder comes last.
#[must_use]
pub fn update_by_id(schema: &TableSchema, columns: &[&TableAttr]) -> Statement {
    let assignments = columns
        .iter()
        .map(|attr| format!("{} = ?", attr.name()))
        .collect::<Vec<_>>()
        .join(", ");
    Statement::new(
        format!(
            "UPDATE {} SET {assignments} WHERE {} = ?",
            schema.name(),
            schema.identity().name()
        ),
        columns.len() + 1,
    )
}

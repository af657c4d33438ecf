//! Per-entity marshaling hooks.
//!
//! A concrete DAO is [`SqlEntityDao`](crate::SqlEntityDao) plus one
//! [`EntityMapper`] implementation; the mapper knows the entity's fields and
//! nothing about connections or transactions.

use crate::table::{TableAttr, TableSchema};
use crate::value::{ResultRow, SqlValue};
use courses_core::{CoursesError, CoursesResult, Identifiable};
use std::fmt::Debug;

/// Which attributes a bind call is filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Every table attribute (insert).
    Full,
    /// Only the present, non-identity attributes (sparse update).
    Sparse,
}

/// Parameter slots for one statement, addressed by attribute name.
///
/// The identity attribute is always bound by the DAO; values the mapper binds
/// for it are ignored. Attributes outside the current selection are skipped,
/// so a mapper can bind every field unconditionally in either mode.
#[derive(Debug)]
pub struct Params<'s> {
    schema: &'s TableSchema,
    mode: BindMode,
    columns: Vec<&'s str>,
    slots: Vec<Option<SqlValue>>,
    problems: Vec<String>,
}

impl<'s> Params<'s> {
    /// Slots for every attribute, identity pre-bound to `identity`.
    pub(crate) fn full(schema: &'s TableSchema, identity: SqlValue) -> Self {
        let columns: Vec<&str> = schema.attributes().iter().map(TableAttr::name).collect();
        let mut slots = vec![None; columns.len()];
        slots[schema.identity_index()] = Some(identity);
        Self {
            schema,
            mode: BindMode::Full,
            columns,
            slots,
            problems: Vec::new(),
        }
    }

    /// Slots for the given present attributes only.
    pub(crate) fn sparse(schema: &'s TableSchema, present: &[&'s TableAttr]) -> Self {
        Self {
            schema,
            mode: BindMode::Sparse,
            columns: present.iter().copied().map(TableAttr::name).collect(),
            slots: vec![None; present.len()],
            problems: Vec::new(),
        }
    }

    /// The mode this parameter set is being filled in.
    #[must_use]
    pub const fn mode(&self) -> BindMode {
        self.mode
    }

    /// Binds a value to the named attribute.
    pub fn bind(&mut self, attribute: &str, value: impl Into<SqlValue>) -> &mut Self {
        if attribute == self.schema.identity().name() {
            return self;
        }
        if !self.schema.contains(attribute) {
            self.problems.push(format!(
                "'{attribute}' is not an attribute of table '{}'",
                self.schema.name()
            ));
            return self;
        }
        if let Some(index) = self.columns.iter().position(|c| *c == attribute) {
            if self.slots[index].is_some() {
                self.problems.push(format!("'{attribute}' was bound twice"));
            } else {
                self.slots[index] = Some(value.into());
            }
        }
        self
    }

    /// Values in column order.
    ///
    /// # Errors
    ///
    /// Returns a data-mapping error if an unknown attribute was bound, an
    /// attribute was bound twice, or a selected attribute was never bound.
    pub(crate) fn into_values(self) -> CoursesResult<Vec<SqlValue>> {
        let mut problems = self.problems;
        let mut values = Vec::with_capacity(self.slots.len());
        for (column, slot) in self.columns.iter().zip(self.slots) {
            match slot {
                Some(value) => values.push(value),
                None => problems.push(format!("'{column}' was not bound")),
            }
        }

        if problems.is_empty() {
            Ok(values)
        } else {
            Err(CoursesError::data_mapping(format!(
                "binding for table '{}' failed: {}",
                self.schema.name(),
                problems.join("; ")
            )))
        }
    }
}

/// Type-specific hooks the generic DAO delegates to.
pub trait EntityMapper: Send + Sync + 'static {
    /// The entity type this mapper marshals.
    type Entity: Identifiable + Debug + Send + Sync + 'static;

    /// Whether the entity may be inserted.
    fn validate_for_insert(&self, entity: &Self::Entity) -> bool;

    /// Binds the entity's attribute values by name.
    fn bind_attributes(&self, entity: &Self::Entity, params: &mut Params<'_>);

    /// Builds an entity from a fetched row.
    ///
    /// # Errors
    ///
    /// Returns a data-mapping error when a column is missing or mistyped.
    fn materialize(&self, row: &ResultRow) -> CoursesResult<Self::Entity>;

    /// One flag per table attribute in column order; `true` means absent.
    fn null_attribute_mask(&self, entity: &Self::Entity) -> Vec<bool>;
}

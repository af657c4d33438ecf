//! EntityDao trait: the operations every single-table DAO exposes.

use crate::filter::Filter;
use async_trait::async_trait;
use courses_core::{CoursesResult, Interface};

/// Batch data access over one table.
///
/// Invalid input is rejected before a connection is checked out. Otherwise a
/// call takes one connection from the shared pool, runs to completion on it,
/// and returns it on every path. Writes commit on success and roll back on
/// failure.
#[async_trait]
pub trait EntityDao<T>: Interface + Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Inserts the entities as one batch.
    ///
    /// The identity is bound as absent so the store assigns it, and each
    /// entity's identity is cleared once the whole batch has bound. If any
    /// entity fails validation or binding, nothing is executed and no entity
    /// is modified.
    async fn add(&self, entities: &mut [T]) -> CoursesResult<()>;

    /// Returns one entity per row matching every predicate, in row order.
    async fn get_by_filter(&self, filter: &Filter) -> CoursesResult<Vec<T>>;

    /// Writes only the present attributes of each entity, keyed by identity.
    ///
    /// Entities with no present attributes are skipped. Every entity must
    /// carry an identity.
    async fn update(&self, entities: &[T]) -> CoursesResult<()>;

    /// Deletes the entities by identity.
    ///
    /// Dependent rows are removed by the schema's referential actions.
    #[deprecated(note = "rely on ON DELETE CASCADE in the schema and delete by identity")]
    async fn delete_cascade(&self, entities: &[T]) -> CoursesResult<()>;
}

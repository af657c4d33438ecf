//! Generic SQL implementation of [`EntityDao`].

use crate::dao::mapper::{EntityMapper, Params};
use crate::dao::EntityDao;
use crate::filter::{validate_filter, Filter};
use crate::pool::{ConnectionPool, PooledConnection};
use crate::statement::{self, BoundStatement, Statement};
use crate::table::TableSchema;
use crate::value::SqlValue;
use async_trait::async_trait;
use courses_core::{CoursesError, CoursesResult, Identifiable};
use std::sync::Arc;
use tracing::{debug, warn};

/// Single-table DAO written once and parameterized by an [`EntityMapper`].
///
/// The insert and delete-by-id statements are generated at construction and
/// reused for every call.
pub struct SqlEntityDao<M: EntityMapper> {
    schema: TableSchema,
    mapper: M,
    pool: Arc<dyn ConnectionPool>,
    insert: Statement,
    delete: Statement,
}

impl<M: EntityMapper> SqlEntityDao<M> {
    /// Creates a DAO for `schema` backed by the shared `pool`.
    pub fn new(schema: TableSchema, mapper: M, pool: Arc<dyn ConnectionPool>) -> Self {
        let insert = statement::insert(&schema);
        let delete = statement::delete_by_id(&schema);
        Self {
            schema,
            mapper,
            pool,
            insert,
            delete,
        }
    }

    /// The table this DAO operates on.
    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// The entity mapper.
    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    async fn acquire(&self) -> CoursesResult<PooledConnection<'_>> {
        Ok(PooledConnection::acquire(self.pool.as_ref()).await?)
    }

    /// Binds the insert with the identity left for the store to assign.
    fn bind_insert(&self, entity: &M::Entity) -> CoursesResult<BoundStatement> {
        let mut params = Params::full(&self.schema, SqlValue::Null);
        self.mapper.bind_attributes(entity, &mut params);
        BoundStatement::new(self.insert.clone(), params.into_values()?)
    }

    /// Builds the sparse update for one entity, or `None` if nothing is present.
    fn bind_sparse(&self, entity: &M::Entity) -> CoursesResult<Option<BoundStatement>> {
        let mask = self.mapper.null_attribute_mask(entity);
        let present = self.schema.present_attributes(&mask)?;
        if present.is_empty() {
            return Ok(None);
        }

        let statement = statement::update_by_id(&self.schema, &present);
        let mut params = Params::sparse(&self.schema, &present);
        self.mapper.bind_attributes(entity, &mut params);

        let mut values = params.into_values()?;
        values.push(SqlValue::from(entity.id()));
        BoundStatement::new(statement, values).map(Some)
    }

    /// Fails with an invalid-entity error naming the first entity without an
    /// identity.
    fn require_identities(&self, entities: &[M::Entity]) -> CoursesResult<()> {
        match entities.iter().find(|entity| !entity.has_id()) {
            Some(entity) => {
                debug!(table = self.schema.name(), "DAO: entity without id, nothing sent");
                Err(CoursesError::invalid_entity(entity, "entity doesn't contain id"))
            }
            None => Ok(()),
        }
    }

    async fn execute_and_commit(
        &self,
        conn: &mut PooledConnection<'_>,
        batch: &[BoundStatement],
    ) -> CoursesResult<()> {
        for bound in batch {
            debug!(
                table = self.schema.name(),
                sql = bound.sql(),
                params = bound.params().len(),
                "DAO: batched statement"
            );
        }

        let outcome = match conn.execute_batch(batch).await {
            Ok(affected) => conn.commit().await.map(|()| affected),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(affected) => {
                debug!(
                    table = self.schema.name(),
                    statements = batch.len(),
                    rows = affected.iter().sum::<u64>(),
                    "DAO: batch committed"
                );
                Ok(())
            }
            Err(cause) => {
                self.rollback_quietly(conn).await;
                Err(CoursesError::Store(cause))
            }
        }
    }

    /// Rolls back, logging instead of returning a failure.
    async fn rollback_quietly(&self, conn: &mut PooledConnection<'_>) {
        if let Err(e) = conn.rollback().await {
            warn!(table = self.schema.name(), error = %e, "DAO: rollback failed");
        }
    }
}

#[async_trait]
impl<M: EntityMapper> EntityDao<M::Entity> for SqlEntityDao<M> {
    async fn add(&self, entities: &mut [M::Entity]) -> CoursesResult<()> {
        if entities.is_empty() {
            return Ok(());
        }

        if let Some(invalid) = entities
            .iter()
            .find(|entity| !self.mapper.validate_for_insert(entity))
        {
            return Err(CoursesError::invalid_entity(
                invalid,
                "entity failed insert validation",
            ));
        }

        let batch = entities
            .iter()
            .map(|entity| self.bind_insert(entity))
            .collect::<CoursesResult<Vec<_>>>()?;
        for entity in entities.iter_mut() {
            entity.set_id(None);
        }

        debug!(table = self.schema.name(), count = batch.len(), "DAO: add");
        let mut conn = self.acquire().await?;
        self.execute_and_commit(&mut conn, &batch).await
    }

    async fn get_by_filter(&self, filter: &Filter) -> CoursesResult<Vec<M::Entity>> {
        if !validate_filter(filter, self.schema.attributes()) {
            return Err(CoursesError::invalid_request(format!(
                "filter doesn't match table '{}': {filter}",
                self.schema.name()
            )));
        }

        let statement = statement::select_by_filter(&self.schema, filter);
        let bound = BoundStatement::new(statement, filter.bound_values())?;
        debug!(table = self.schema.name(), sql = bound.sql(), "DAO: get_by_filter");

        let rows = {
            let mut conn = self.acquire().await?;
            conn.query(&bound).await?
        };

        debug!(table = self.schema.name(), rows = rows.len(), "DAO: rows fetched");
        rows.iter().map(|row| self.mapper.materialize(row)).collect()
    }

    async fn update(&self, entities: &[M::Entity]) -> CoursesResult<()> {
        if entities.is_empty() {
            return Ok(());
        }

        self.require_identities(entities)?;

        let mut batch = Vec::new();
        for entity in entities {
            match self.bind_sparse(entity)? {
                Some(bound) => batch.push(bound),
                None => debug!(
                    table = self.schema.name(),
                    id = ?entity.id(),
                    "DAO: nothing to update, skipping"
                ),
            }
        }

        if batch.is_empty() {
            return Ok(());
        }

        debug!(table = self.schema.name(), count = batch.len(), "DAO: update");
        let mut conn = self.acquire().await?;
        self.execute_and_commit(&mut conn, &batch).await
    }

    async fn delete_cascade(&self, entities: &[M::Entity]) -> CoursesResult<()> {
        if entities.is_empty() {
            return Ok(());
        }

        self.require_identities(entities)?;

        let batch = entities
            .iter()
            .map(|entity| {
                BoundStatement::new(self.delete.clone(), vec![SqlValue::from(entity.id())])
            })
            .collect::<CoursesResult<Vec<_>>>()?;

        debug!(table = self.schema.name(), count = batch.len(), "DAO: delete_cascade");
        let mut conn = self.acquire().await?;
        self.execute_and_commit(&mut conn, &batch).await
    }
}

impl<M: EntityMapper> std::fmt::Debug for SqlEntityDao<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlEntityDao")
            .field("table", &self.schema.name())
            .field("insert", &self.insert.sql())
            .field("delete", &self.delete.sql())
            .finish_non_exhaustive()
    }
}

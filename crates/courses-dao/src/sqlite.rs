//! SQLite connection adapter.

use crate::pool::StoreConnection;
use crate::statement::BoundStatement;
use crate::value::{ResultRow, SqlValue};
use async_trait::async_trait;
use courses_core::StoreError;
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};
use tracing::{debug, warn};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A pooled SQLite connection in manual-commit mode.
///
/// Write transactions start with `BEGIN IMMEDIATE` so concurrent writers
/// wait on the busy timeout instead of failing on lock upgrade. A connection
/// dropped with a transaction still open is closed rather than returned to
/// the pool, which makes SQLite roll the transaction back.
pub struct SqliteStoreConnection {
    conn: PoolConnection<Sqlite>,
    in_transaction: bool,
}

impl SqliteStoreConnection {
    /// Wraps a connection checked out of a sqlx pool.
    #[must_use]
    pub fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    /// Whether a transaction is open on this connection.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

fn bind_params<'q>(mut query: SqliteQuery<'q>, params: &'q [SqlValue]) -> SqliteQuery<'q> {
    for value in params {
        query = match value {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Bytes(v) => query.bind(v.as_slice()),
        };
    }
    query
}

impl TryFrom<&SqliteRow> for ResultRow {
    type Error = sqlx::Error;

    /// Decodes by the storage class of each value, not the declared column type.
    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let mut pairs = Vec::with_capacity(row.len());
        for (index, column) in row.columns().iter().enumerate() {
            let raw = row.try_get_raw(index)?;
            let value = if raw.is_null() {
                SqlValue::Null
            } else {
                let storage = raw.type_info().name().to_string();
                match storage.as_str() {
                    "INTEGER" | "BOOLEAN" | "NUMERIC" => {
                        SqlValue::Integer(row.try_get_unchecked(index)?)
                    }
                    "REAL" => SqlValue::Real(row.try_get_unchecked(index)?),
                    "BLOB" => SqlValue::Bytes(row.try_get_unchecked(index)?),
                    _ => SqlValue::Text(row.try_get_unchecked(index)?),
                }
            };
            pairs.push((column.name().to_string(), value));
        }
        Ok(Self::from_pairs(pairs))
    }
}

#[async_trait]
impl StoreConnection for SqliteStoreConnection {
    async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<u64>, StoreError> {
        if !self.in_transaction {
            sqlx::query("BEGIN IMMEDIATE").execute(&mut *self.conn).await?;
            self.in_transaction = true;
        }

        let mut affected = Vec::with_capacity(batch.len());
        for bound in batch {
            let result = bind_params(sqlx::query(bound.sql()), bound.params())
                .execute(&mut *self.conn)
                .await?;
            affected.push(result.rows_affected());
        }
        Ok(affected)
    }

    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<ResultRow>, StoreError> {
        let rows = bind_params(sqlx::query(statement.sql()), statement.params())
            .fetch_all(&mut *self.conn)
            .await?;
        rows.iter()
            .map(|row| ResultRow::try_from(row).map_err(StoreError::from))
            .collect()
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            sqlx::query("COMMIT").execute(&mut *self.conn).await?;
            self.in_transaction = false;
            debug!("SQLite: transaction committed");
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if self.in_transaction {
            sqlx::query("ROLLBACK").execute(&mut *self.conn).await?;
            self.in_transaction = false;
            debug!("SQLite: transaction rolled back");
        }
        Ok(())
    }
}

impl Drop for SqliteStoreConnection {
    fn drop(&mut self) {
        if self.in_transaction {
            warn!("SQLite: connection dropped inside a transaction, closing it");
            self.conn.close_on_drop();
        }
    }
}

impl std::fmt::Debug for SqliteStoreConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStoreConnection")
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

//! Connection pool abstraction and the sqlx-backed SQLite pool.

use crate::sqlite::SqliteStoreConnection;
use crate::statement::BoundStatement;
use crate::value::ResultRow;
use async_trait::async_trait;
use courses_config::DatabaseConfig;
use courses_core::{CoursesError, CoursesResult, Interface, StoreError};
use shaku::Component;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// One exclusively owned database connection in manual-commit mode.
///
/// The first `execute_batch` after a commit or rollback opens a transaction.
/// `commit` and `rollback` without an open transaction do nothing. Reads
/// never open a transaction.
#[async_trait]
pub trait StoreConnection: Send {
    /// Executes every statement in order; returns rows affected per statement.
    async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<u64>, StoreError>;

    /// Runs a query and fetches every row.
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<ResultRow>, StoreError>;

    /// Commits the open transaction.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Rolls back the open transaction.
    async fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Supplies and reclaims connections.
///
/// Shared across callers as `Arc<dyn ConnectionPool>`; each concurrent caller
/// gets its own connection.
#[async_trait]
pub trait ConnectionPool: Interface + Send + Sync {
    /// Checks out a connection.
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError>;

    /// Returns a connection. Called exactly once per successful `acquire`.
    fn release(&self, connection: Box<dyn StoreConnection>);
}

/// Scoped connection that is released back to its pool when dropped.
pub struct PooledConnection<'a> {
    pool: &'a dyn ConnectionPool,
    connection: Option<Box<dyn StoreConnection>>,
}

impl<'a> PooledConnection<'a> {
    /// Acquires a connection from `pool`.
    pub async fn acquire(pool: &'a dyn ConnectionPool) -> Result<PooledConnection<'a>, StoreError> {
        let connection = pool.acquire().await?;
        debug!("Pool: connection acquired");
        Ok(Self {
            pool,
            connection: Some(connection),
        })
    }

    /// Releases the connection now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }

    fn live(&mut self) -> Result<&mut (dyn StoreConnection + 'static), StoreError> {
        self.connection
            .as_deref_mut()
            .ok_or_else(|| StoreError::connection("connection already released"))
    }

    /// See [`StoreConnection::execute_batch`].
    pub async fn execute_batch(&mut self, batch: &[BoundStatement]) -> Result<Vec<u64>, StoreError> {
        self.live()?.execute_batch(batch).await
    }

    /// See [`StoreConnection::query`].
    pub async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<ResultRow>, StoreError> {
        self.live()?.query(statement).await
    }

    /// See [`StoreConnection::commit`].
    pub async fn commit(&mut self) -> Result<(), StoreError> {
        self.live()?.commit().await
    }

    /// See [`StoreConnection::rollback`].
    pub async fn rollback(&mut self) -> Result<(), StoreError> {
        self.live()?.rollback().await
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
            debug!("Pool: connection released");
        }
    }
}

impl std::fmt::Debug for PooledConnection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("live", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}

/// SQLite connection pool.
#[derive(Component)]
#[shaku(interface = ConnectionPool)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    ///
    /// Alias: [`connect`](Self::connect)
    pub async fn new(config: &DatabaseConfig) -> CoursesResult<Self> {
        info!("Connecting to SQLite database...");

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| CoursesError::configuration(format!("Invalid database URL: {e}")))?
            .create_if_missing(config.create_if_missing);
        if !config.log_statements {
            options = options.disable_statement_logging();
        }

        let pool = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                CoursesError::Store(StoreError::connection(format!("Failed to connect: {e}")))
            })?;

        info!(
            max_connections = config.max_connections,
            "SQLite connection pool established"
        );
        Ok(Self { pool })
    }

    /// Creates a new database pool from configuration.
    ///
    /// This is an alias for [`new`](Self::new).
    pub async fn connect(config: &DatabaseConfig) -> CoursesResult<Self> {
        Self::new(config).await
    }

    /// Wraps an existing sqlx pool.
    #[must_use]
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn inner(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the database connection is healthy.
    pub async fn health_check(&self) -> CoursesResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::connection(format!("Health check failed: {e}")))?;
        Ok(())
    }

    /// Closes the database pool.
    pub async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

#[async_trait]
impl ConnectionPool for DatabasePool {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let connection = self.pool.acquire().await?;
        Ok(Box::new(SqliteStoreConnection::new(connection)))
    }

    fn release(&self, connection: Box<dyn StoreConnection>) {
        // sqlx returns the connection to its idle queue on drop.
        drop(connection);
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

/// Creates a shared database pool.
pub async fn create_pool(config: &DatabaseConfig) -> CoursesResult<std::sync::Arc<DatabasePool>> {
    let pool = DatabasePool::new(config).await?;
    Ok(std::sync::Arc::new(pool))
}

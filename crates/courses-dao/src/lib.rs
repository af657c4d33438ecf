//! # Courses DAO
//!
//! Generic single-table data access for the student courses store.
//!
//! ```text
//! caller
//!   ↓  Vec<Entity> / Filter
//! SqlEntityDao<M>               (add, get_by_filter, update, delete_cascade)
//!   ↓  EntityMapper             (validate, bind, materialize, absent mask)
//!   ↓  statement::*             (parameterized SQL per table)
//!   ↓  Arc<dyn ConnectionPool>  (PooledConnection guard, manual commit)
//! DatabasePool                  (sqlx SQLite)
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   table.rs                  ← TableAttr, TableSchema
//!   filter.rs                 ← Filter, validate_filter
//!   value.rs                  ← SqlValue, ResultRow
//!   statement.rs              ← SQL generation
//!   pool.rs                   ← ConnectionPool, PooledConnection, DatabasePool
//!   sqlite.rs                 ← SqliteStoreConnection
//!   di.rs                     ← PersistenceModule
//!   dao/
//!     entity_dao.rs           ← EntityDao trait
//!     mapper.rs               ← EntityMapper, Params
//!     impl/
//!       sql_entity_dao.rs     ← SqlEntityDao
//! ```

pub mod dao;
pub mod di;
pub mod filter;
pub mod pool;
pub mod sqlite;
pub mod statement;
pub mod table;
pub mod value;

pub use dao::{BindMode, EntityDao, EntityMapper, Params, SqlEntityDao};
pub use di::*;
pub use filter::*;
pub use pool::*;
pub use sqlite::SqliteStoreConnection;
pub use statement::{BoundStatement, Statement};
pub use table::*;
pub use value::*;

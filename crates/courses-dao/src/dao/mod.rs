//! DAO (Data Access Object) layer.
//!
//! ```text
//! EntityDao<T>          (operations, dao/entity_dao.rs)
//!   ↑
//! SqlEntityDao<M>       (generic impl, dao/impl/sql_entity_dao.rs)
//!   ↓  EntityMapper     (per-entity hooks, dao/mapper.rs)
//!   ↓  Arc<dyn ConnectionPool>
//! SQLite
//! ```

pub mod entity_dao;
pub mod r#impl;
pub mod mapper;

pub use entity_dao::EntityDao;
pub use mapper::{BindMode, EntityMapper, Params};
pub use r#impl::SqlEntityDao;

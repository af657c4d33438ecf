//! DAO implementations.
//!
//! Trait definitions live in the parent `dao/` module.

pub mod sql_entity_dao;

pub use sql_entity_dao::SqlEntityDao;

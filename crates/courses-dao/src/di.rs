//! Dependency injection module using Shaku.
//!
//! `PersistenceModule` owns the shared connection pool. Startup code builds it
//! once and resolves `Arc<dyn ConnectionPool>` for every DAO it constructs.

use crate::pool::{ConnectionPool, DatabasePool, DatabasePoolParameters};
use courses_config::DatabaseConfig;
use courses_core::CoursesResult;
use shaku::{module, HasComponent};
use std::sync::Arc;

module! {
    pub PersistenceModule {
        components = [
            DatabasePool,
        ],
        providers = [],
    }
}

/// Connects to the configured database and wraps the pool in a module.
pub async fn build_persistence_module(
    config: &DatabaseConfig,
) -> CoursesResult<Arc<PersistenceModule>> {
    let pool = DatabasePool::connect(config).await?;

    let module = PersistenceModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: pool.inner().clone(),
        })
        .build();

    Ok(Arc::new(module))
}

/// Resolves the shared pool from a module.
#[must_use]
pub fn resolve_pool(module: &PersistenceModule) -> Arc<dyn ConnectionPool> {
    module.resolve()
}

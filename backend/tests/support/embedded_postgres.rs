//! Per-test databases on the shared embedded cluster.
//!
//! Each test gets its own temporary database with the embedded migrations
//! applied, so suites can run in parallel without sharing rows.

use medlink::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

fn new_test_database_name() -> String {
    format!("medlink_test_{}", Uuid::new_v4().simple())
}

/// Create a migrated temporary database. Dropped with the returned guard.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let name = new_test_database_name();
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create temporary database: {err:?}"))?;
    run_pending_migrations(database.url()).map_err(|err| err.to_string())?;
    Ok(database)
}

/// Small pool over `url`; tests never need more than a few connections.
pub async fn small_pool(url: &str) -> Result<DbPool, String> {
    DbPool::new(PoolConfig::new(url).with_max_size(4).with_min_idle(Some(1)))
        .await
        .map_err(|err| err.to_string())
}

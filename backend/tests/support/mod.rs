//! Shared helpers for the embedded PostgreSQL suites.
//!
//! Integration tests compile as separate crates, so each suite pulls this
//! module in with `mod support;`.
//!
//! Cluster bootstrap and migrations run outside any Tokio runtime; each
//! database carries its own runtime and tests drive async calls through
//! [`TestDatabase::block_on`].

pub mod cluster_skip;
pub mod embedded_postgres;
pub mod pg_embed;

use std::future::Future;

use medlink::outbound::persistence::DbPool;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use tokio::runtime::Runtime;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_database, small_pool};
pub use pg_embed::shared_cluster;

/// Temporary migrated database, a pool over it and the runtime that owns
/// the pool's connections.
pub struct TestDatabase {
    pub pool: DbPool,
    runtime: Runtime,
    _database: TemporaryDatabase,
}

impl TestDatabase {
    /// Run `future` to completion on this database's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn setup() -> Result<TestDatabase, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster)?;
    let pool = runtime.block_on(small_pool(database.url()))?;
    Ok(TestDatabase {
        pool,
        runtime,
        _database: database,
    })
}

/// Provision a database, or `None` when the cluster is unavailable and
/// `SKIP_TEST_CLUSTER` is set.
pub fn test_database() -> Option<TestDatabase> {
    match setup() {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! `diesel-async` connections from a shared `bb8` pool.
//!
//! - Repositories only translate between row structs (`models.rs`) and domain
//!   types; no workflow rules live here.
//! - Row structs and `schema.rs` stay private to this module.
//! - Driver errors are classified once (`diesel_error_mapping.rs`) and mapped
//!   to each port's error enum.
//!
//! # Example
//!
//! ```no_run
//! use medlink::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), medlink::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/medlink")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_consultation_repository;
mod diesel_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_consultation_repository::DieselConsultationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, migrate, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no workflow rules.

pub mod persistence;

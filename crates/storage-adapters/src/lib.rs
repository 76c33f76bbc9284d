//! # storage-adapters
//!
//! Implementations of the `domains` ports.
//!
//! - [`memory::InMemoryStore`] is always compiled; used by tests and by the
//!   bot when no database feature is enabled.
//! - [`sqlite::SqliteStore`] is behind the `db-sqlite` feature.

mod catalog;
pub mod memory;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use memory::InMemoryStore;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;

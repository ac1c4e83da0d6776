//! Backend implementations.
//!
//! - [`memory`] - In-memory store and evaluator (always available)
//! - [`sqlite`] - SQLite store and evaluator (feature `sqlite`)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

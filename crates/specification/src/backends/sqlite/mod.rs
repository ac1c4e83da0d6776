//! SQLite backend implementation.
//!
//! Evaluates Specifications as SQL. Supports in-memory databases (for tests)
//! and file-based databases.
//!
//! # Example
//!
//! ```no_run
//! use helios_specification::backends::sqlite::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//! store.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE entities (
//!     collection TEXT NOT NULL,
//!     id TEXT NOT NULL,
//!     data TEXT NOT NULL,          -- JSON document without relation fields
//!     PRIMARY KEY (collection, id)
//! );
//!
//! CREATE TABLE entity_relations (
//!     collection TEXT NOT NULL,
//!     entity_id TEXT NOT NULL,
//!     relation TEXT NOT NULL,
//!     data TEXT NOT NULL,          -- JSON value of the relation field
//!     PRIMARY KEY (collection, entity_id, relation)
//! );
//! ```

mod backend;
mod evaluator;
mod query_builder;
mod schema;

pub use backend::{SqliteStore, SqliteStoreConfig};
pub use evaluator::SqliteEvaluator;
pub use query_builder::{SqlFragment, SqlParam, SqlTranslator};
pub use schema::SCHEMA_VERSION;

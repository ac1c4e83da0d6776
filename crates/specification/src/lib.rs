//! Helios Specification Engine
//!
//! This crate expresses data-access queries as immutable, declarative
//! **Specifications** (filter criteria, relation includes, ordering, paging
//! and projection) and evaluates them uniformly against a persisted store and
//! an in-memory store, with identical observable results.
//!
//! # Features
//!
//! - **Immutable Specifications**: built once through a fluent builder, cheap
//!   to clone, safe to share between tasks
//! - **Two evaluators**: SQL translation for SQLite, direct iteration for
//!   in-memory collections; same ordered output for the same data
//! - **Repository façade**: `find`, `find_one`, `count`, `exists`,
//!   `find_paged`, `find_projected`, `find_one_projected`
//! - **Cooperative cancellation**: in-flight SQLite queries are interrupted
//!   when the caller's token fires
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite store with in-memory and file modes
//!
//! The in-memory backend is always available.
//!
//! # Architecture
//!
//! - [`specification`] - Specifications, criteria, ordering keys, the builder
//! - [`types`] - Scalar values, field paths, pagination shapes
//! - [`error`] - Error types for all operations
//! - [`core`] - Entity, evaluator and repository traits
//! - [`backends`] - In-memory and SQLite implementations
//! - [`repository`] - The repository bound to a concrete backend
//!
//! # Pipeline
//!
//! Every evaluator applies a Specification in the same fixed order:
//!
//! ```text
//! filter → include → order → project → page
//! ```
//!
//! Orderings always end with an implicit `id ASC`, and null handling follows
//! SQLite's rules in both backends, so results are deterministic and equal
//! across backends.
//!
//! # Quick Start
//!
//! ```
//! use helios_specification::specification::{Criterion, Specification};
//!
//! # #[derive(Clone)] struct Order;
//! fn recent_large_orders() -> Specification<Order> {
//!     Specification::builder()
//!         .filter(Criterion::ge("total", 500))
//!         .filter(Criterion::eq("status", "shipped"))
//!         .include("lines")
//!         .order_by_desc("placed_at")
//!         .page(1, 20)
//!         .no_tracking()
//!         .build()
//! }
//!
//! let spec = recent_large_orders();
//! assert_eq!(spec.criteria().len(), 2);
//! assert_eq!(spec.skip(), Some(0));
//! assert_eq!(spec.take(), Some(20));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod repository;
pub mod specification;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BackendError, EvaluationError, StorageError, StorageResult};
pub use specification::{Criterion, OrderKey, SortDirection, Specification, SpecificationBuilder};
pub use types::{PageMetadata, PagedResult, ScalarValue};

// Re-export core traits
pub use core::{BackendKind, CancellationToken, Entity, EvaluationMode, Evaluator, ReadRepository};

pub use repository::{InMemoryRepository, Repository};
#[cfg(feature = "sqlite")]
pub use repository::SqliteRepository;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

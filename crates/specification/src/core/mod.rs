//! Core traits and abstractions.
//!
//! - [`Entity`] - What can be queried
//! - [`Evaluator`] - Interprets a Specification against one kind of source
//! - [`ReadRepository`] - Domain-facing read operations over an evaluator
//! - [`CancellationToken`] - Cooperative cancellation handed down by callers
//!
//! # Layering
//!
//! ```text
//! ReadRepository<E>            find / find_one / count / exists / find_paged / find_projected
//!     └── Evaluator<E>         evaluate(source, spec, mode) / count(source, spec)
//!             ├── SqliteEvaluator     → SQL, executed server-side
//!             └── InMemoryEvaluator   → the same pipeline over a Vec
//! ```

pub mod backend;
pub mod cancel;
pub mod entity;
pub mod evaluator;
pub mod repository;

pub use backend::BackendKind;
pub use cancel::CancellationToken;
pub use entity::Entity;
pub use evaluator::{EvaluationMode, Evaluator};
pub use repository::ReadRepository;

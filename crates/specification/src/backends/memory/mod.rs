//! In-memory backend.
//!
//! Holds entities in a plain `Vec` and runs the Specification pipeline over
//! it directly. Relations are already part of each entity, so includes are
//! no-ops. It exists to make service code testable without a database while
//! returning exactly what the SQLite backend would return.
//!
//! # Example
//!
//! ```
//! # use serde::{Deserialize, Serialize};
//! # use helios_specification::core::Entity;
//! use helios_specification::backends::memory::{InMemoryEvaluator, InMemoryStore};
//! use helios_specification::core::EvaluationMode;
//! use helios_specification::specification::{Criterion, Specification};
//!
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Task { id: String, done: bool }
//! # impl Entity for Task {
//! #     const COLLECTION: &'static str = "tasks";
//! #     fn id(&self) -> String { self.id.clone() }
//! # }
//! let store = InMemoryStore::new();
//! store.put(Task { id: "t1".into(), done: true });
//! store.put(Task { id: "t2".into(), done: false });
//!
//! let spec = Specification::builder()
//!     .filter(Criterion::eq("done", false))
//!     .build();
//!
//! let open = store
//!     .read(|rows| InMemoryEvaluator::new().evaluate_rows(rows, &spec, EvaluationMode::Full))
//!     .unwrap();
//! assert_eq!(open.len(), 1);
//! ```

mod evaluator;
mod store;

pub use evaluator::InMemoryEvaluator;
pub use store::InMemoryStore;

//! Ordering keys.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FieldPath, ScalarValue};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order. NULLs first.
    #[default]
    Ascending,
    /// Descending order. NULLs last.
    Descending,
}

impl SortDirection {
    /// Returns the SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }

    /// Applies the direction to an ascending comparison.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Computes a sort key directly from the entity.
pub type KeyFn<E> = Arc<dyn Fn(&E) -> ScalarValue + Send + Sync>;

/// What to sort by.
pub enum OrderKey<E> {
    /// A field of the entity document.
    Field(FieldPath),
    /// A computed key. Only the in-memory evaluator can sort by it.
    Computed {
        /// Human-readable name for errors and logs.
        label: String,
        /// The key selector.
        key: KeyFn<E>,
    },
}

impl<E> OrderKey<E> {
    /// Sorts by a document field.
    pub fn field(path: impl Into<FieldPath>) -> Self {
        OrderKey::Field(path.into())
    }

    /// Sorts by a computed key.
    pub fn computed<F>(label: impl Into<String>, key: F) -> Self
    where
        F: Fn(&E) -> ScalarValue + Send + Sync + 'static,
    {
        OrderKey::Computed {
            label: label.into(),
            key: Arc::new(key),
        }
    }

    /// Extracts the key value for one entity.
    pub fn extract(&self, entity: &E, document: &Value) -> ScalarValue {
        match self {
            OrderKey::Field(path) => path.extract(document),
            OrderKey::Computed { key, .. } => key(entity),
        }
    }
}

impl<E> Clone for OrderKey<E> {
    fn clone(&self) -> Self {
        match self {
            OrderKey::Field(path) => OrderKey::Field(path.clone()),
            OrderKey::Computed { label, key } => OrderKey::Computed {
                label: label.clone(),
                key: Arc::clone(key),
            },
        }
    }
}

impl<E> From<&str> for OrderKey<E> {
    fn from(path: &str) -> Self {
        OrderKey::Field(FieldPath::new(path))
    }
}

impl<E> From<String> for OrderKey<E> {
    fn from(path: String) -> Self {
        OrderKey::Field(FieldPath::new(path))
    }
}

impl<E> From<FieldPath> for OrderKey<E> {
    fn from(path: FieldPath) -> Self {
        OrderKey::Field(path)
    }
}

impl<E> fmt::Display for OrderKey<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKey::Field(path) => write!(f, "{}", path),
            OrderKey::Computed { label, .. } => write!(f, "computed key '{}'", label),
        }
    }
}

/// One `(key, direction)` pair of an ordering.
pub struct OrderBy<E> {
    /// The key.
    pub key: OrderKey<E>,
    /// The direction.
    pub direction: SortDirection,
}

impl<E> Clone for OrderBy<E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            direction: self.direction,
        }
    }
}

impl<E> fmt::Debug for OrderBy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderBy({} {})", self.key, self.direction.as_sql())
    }
}

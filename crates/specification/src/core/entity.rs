//! The entity contract shared by every backend.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A domain type that can be queried with a Specification.
///
/// Entities serialize to a JSON object; criteria and ordering keys address
/// fields of that object by [`FieldPath`](crate::types::FieldPath).
///
/// # Relations
///
/// Fields named by [`relations`](Entity::relations) are kept apart from the
/// entity row by persisted stores and only loaded when a Specification
/// includes them. Such fields must deserialize from absence, typically with
/// `#[serde(default)]`. Criteria and ordering keys must not reach into a
/// relation; a persisted store rejects them as unsupported.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use helios_specification::core::Entity;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Customer {
///     id: String,
///     name: String,
///     #[serde(default)]
///     orders: Vec<String>,
/// }
///
/// impl Entity for Customer {
///     const COLLECTION: &'static str = "customers";
///
///     fn id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn relations() -> &'static [&'static str] {
///         &["orders"]
///     }
/// }
///
/// assert_eq!(Customer::COLLECTION, "customers");
/// assert!(Customer::is_relation("orders"));
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection this entity lives in.
    const COLLECTION: &'static str;

    /// Identity, unique within the collection.
    ///
    /// Also the final tie-breaker of every ordering (ascending, bytewise).
    fn id(&self) -> String;

    /// Top-level fields that are relations.
    fn relations() -> &'static [&'static str] {
        &[]
    }

    /// Returns true if `name` is a declared relation.
    fn is_relation(name: &str) -> bool {
        Self::relations().contains(&name)
    }
}

//! Immutable query specifications.
//!
//! A [`Specification`] describes *what* to fetch: filter criteria, relations
//! to materialize, ordering, a paging window and an optional projection. It
//! says nothing about *where* to fetch from; any evaluator can interpret it.
//!
//! Every evaluator applies the parts in the same fixed order:
//!
//! ```text
//! filter → include → order → project → page
//! ```
//!
//! Specifications are built with [`SpecificationBuilder`] and are immutable
//! afterwards. They are cheap to clone and safe to share between threads.
//! Reusable queries are plain factory functions:
//!
//! ```
//! use helios_specification::specification::{Criterion, Specification};
//!
//! # #[derive(Clone)] struct Customer;
//! fn active_customers_by_name() -> Specification<Customer> {
//!     Specification::builder()
//!         .filter(Criterion::eq("active", true))
//!         .order_by_asc("name")
//!         .build()
//! }
//!
//! let spec = active_customers_by_name();
//! assert_eq!(spec.criteria().len(), 1);
//! ```

mod builder;
pub mod criterion;
pub mod ordering;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::EvaluationError;

pub use builder::SpecificationBuilder;
pub use criterion::{CompareOp, Criterion, PredicateFn};
pub use ordering::{KeyFn, OrderBy, OrderKey, SortDirection};

/// Transforms an entity into a derived value.
pub type Projection<E, P> = Arc<dyn Fn(&E) -> P + Send + Sync>;

/// Everything except the projection, shared between clones.
pub(crate) struct SpecificationParts<E> {
    pub(crate) criteria: Vec<Criterion<E>>,
    pub(crate) includes: BTreeSet<String>,
    pub(crate) orderings: Vec<OrderBy<E>>,
    pub(crate) skip: Option<i64>,
    pub(crate) take: Option<i64>,
    pub(crate) tracking_disabled: bool,
}

/// A validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PagingWindow {
    /// Rows to skip.
    pub skip: u64,
    /// Maximum rows to return; `None` returns everything after `skip`.
    pub take: Option<u64>,
}

impl PagingWindow {
    /// Returns true if this window neither skips nor limits.
    pub fn is_unbounded(&self) -> bool {
        self.skip == 0 && self.take.is_none()
    }

    /// Applies the window to an ordered sequence.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .take
            .map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));
        items.into_iter().skip(skip).take(take).collect()
    }
}

/// An immutable description of a query over entities of type `E`,
/// optionally projecting each result into a `P`.
pub struct Specification<E, P = E> {
    parts: Arc<SpecificationParts<E>>,
    projection: Option<Projection<E, P>>,
}

impl<E> Specification<E> {
    /// Starts building a Specification.
    pub fn builder() -> SpecificationBuilder<E> {
        SpecificationBuilder::new()
    }

    /// A Specification matching every entity, unordered and unpaged.
    pub fn all() -> Self {
        SpecificationBuilder::new().build()
    }
}

impl<E, P> Specification<E, P> {
    /// Returns the criteria; all of them must hold.
    pub fn criteria(&self) -> &[Criterion<E>] {
        &self.parts.criteria
    }

    /// Returns the relations to materialize.
    pub fn includes(&self) -> &BTreeSet<String> {
        &self.parts.includes
    }

    /// Returns the ordering keys, primary first.
    pub fn orderings(&self) -> &[OrderBy<E>] {
        &self.parts.orderings
    }

    /// Returns the raw `skip` value.
    pub fn skip(&self) -> Option<i64> {
        self.parts.skip
    }

    /// Returns the raw `take` value.
    pub fn take(&self) -> Option<i64> {
        self.parts.take
    }

    /// Returns true if a paging window is set.
    pub fn is_paged(&self) -> bool {
        self.parts.skip.is_some() || self.parts.take.is_some()
    }

    /// Returns true if results need not stay attached to a tracking context.
    pub fn is_tracking_disabled(&self) -> bool {
        self.parts.tracking_disabled
    }

    /// Returns the projection, if one is set.
    pub fn projection(&self) -> Option<&Projection<E, P>> {
        self.projection.as_ref()
    }

    /// Returns true if a projection is set.
    pub fn has_projection(&self) -> bool {
        self.projection.is_some()
    }

    /// Checks the paging window. Negative values are rejected, never clamped.
    pub fn paging_window(&self) -> Result<PagingWindow, EvaluationError> {
        let skip = match self.parts.skip {
            Some(value) if value < 0 => {
                return Err(EvaluationError::InvalidPaging {
                    parameter: "skip",
                    value,
                });
            }
            Some(value) => value as u64,
            None => 0,
        };
        let take = match self.parts.take {
            Some(value) if value < 0 => {
                return Err(EvaluationError::InvalidPaging {
                    parameter: "take",
                    value,
                });
            }
            Some(value) => Some(value as u64),
            None => None,
        };
        Ok(PagingWindow { skip, take })
    }

    /// Returns true if every criterion holds for the entity.
    pub fn is_satisfied_by(&self, entity: &E, document: &Value) -> bool {
        self.parts
            .criteria
            .iter()
            .all(|criterion| criterion.matches(entity, document))
    }

    /// Applies the projection to already evaluated entities.
    pub fn project(&self, entities: Vec<E>) -> Result<Vec<P>, EvaluationError> {
        let projection = self
            .projection
            .as_ref()
            .ok_or(EvaluationError::MissingProjection)?;
        Ok(entities.iter().map(|entity| projection(entity)).collect())
    }

    /// Starts a new builder from a copy of this Specification.
    pub fn to_builder(&self) -> SpecificationBuilder<E, P> {
        SpecificationBuilder::from_parts(&self.parts, self.projection.clone())
    }

    /// The same Specification with the paging window removed.
    pub fn without_paging(&self) -> Self {
        self.to_builder().unpaged().build()
    }

    /// The same Specification narrowed to its first result.
    ///
    /// `take = 0` and negative values are kept so they still mean
    /// "nothing" and `InvalidPaging` respectively.
    pub(crate) fn first_only(&self) -> Self {
        match self.parts.take {
            Some(take) if take <= 1 => self.clone(),
            _ => self.to_builder().take(1).build(),
        }
    }
}

impl<E, P> Clone for Specification<E, P> {
    fn clone(&self) -> Self {
        Self {
            parts: Arc::clone(&self.parts),
            projection: self.projection.clone(),
        }
    }
}

impl<E, P> fmt::Debug for Specification<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("criteria", &self.parts.criteria)
            .field("includes", &self.parts.includes)
            .field("orderings", &self.parts.orderings)
            .field("skip", &self.parts.skip)
            .field("take", &self.parts.take)
            .field("has_projection", &self.projection.is_some())
            .field("tracking_disabled", &self.parts.tracking_disabled)
            .finish()
    }
}

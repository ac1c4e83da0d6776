//! Fluent construction of [`Specification`] values.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::criterion::Criterion;
use super::ordering::{OrderBy, OrderKey, SortDirection};
use super::{Projection, Specification, SpecificationParts};

/// Accumulates the parts of a [`Specification`].
///
/// # Semantics
///
/// - [`filter`](Self::filter), [`order_by`](Self::order_by) append: criteria
///   are AND-combined, orderings apply in call order (primary first).
/// - [`include`](Self::include) adds to a set; duplicates collapse.
/// - [`skip`](Self::skip), [`take`](Self::take), [`page`](Self::page) and
///   [`select`](Self::select) replace any earlier value (last write wins).
/// - [`build`](Self::build) consumes the builder. To derive a variant of a
///   finished Specification, start again from
///   [`Specification::to_builder`], which works on a fresh copy.
///
/// Negative `skip`/`take` values are accepted here and rejected with
/// `InvalidPaging` when the Specification is evaluated.
pub struct SpecificationBuilder<E, P = E> {
    criteria: Vec<Criterion<E>>,
    includes: BTreeSet<String>,
    orderings: Vec<OrderBy<E>>,
    skip: Option<i64>,
    take: Option<i64>,
    projection: Option<Projection<E, P>>,
    tracking_disabled: bool,
}

impl<E> SpecificationBuilder<E> {
    /// Creates an empty builder: no criteria, no paging, no projection.
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
            includes: BTreeSet::new(),
            orderings: Vec::new(),
            skip: None,
            take: None,
            projection: None,
            tracking_disabled: false,
        }
    }
}

impl<E> Default for SpecificationBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> SpecificationBuilder<E, P> {
    pub(crate) fn from_parts(
        parts: &SpecificationParts<E>,
        projection: Option<Projection<E, P>>,
    ) -> Self {
        Self {
            criteria: parts.criteria.clone(),
            includes: parts.includes.clone(),
            orderings: parts.orderings.clone(),
            skip: parts.skip,
            take: parts.take,
            projection,
            tracking_disabled: parts.tracking_disabled,
        }
    }

    /// Adds a criterion.
    pub fn filter(mut self, criterion: Criterion<E>) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Adds every criterion from an iterator.
    pub fn filter_all(mut self, criteria: impl IntoIterator<Item = Criterion<E>>) -> Self {
        self.criteria.extend(criteria);
        self
    }

    /// Requests that a relation be materialized with each entity.
    pub fn include(mut self, relation: impl Into<String>) -> Self {
        self.includes.insert(relation.into());
        self
    }

    /// Appends an ordering key.
    pub fn order_by(mut self, key: impl Into<OrderKey<E>>, direction: SortDirection) -> Self {
        self.orderings.push(OrderBy {
            key: key.into(),
            direction,
        });
        self
    }

    /// Appends an ascending ordering key.
    pub fn order_by_asc(self, key: impl Into<OrderKey<E>>) -> Self {
        self.order_by(key, SortDirection::Ascending)
    }

    /// Appends a descending ordering key.
    pub fn order_by_desc(self, key: impl Into<OrderKey<E>>) -> Self {
        self.order_by(key, SortDirection::Descending)
    }

    /// Sets how many ordered results to skip.
    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of results.
    pub fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    /// Sets skip/take from a 1-based page number and a page size.
    ///
    /// Page numbers below 1 are treated as page 1.
    pub fn page(self, page_number: i64, page_size: i64) -> Self {
        let page_index = page_number.max(1) - 1;
        self.skip(page_index.saturating_mul(page_size)).take(page_size)
    }

    /// Removes any paging window.
    pub fn unpaged(mut self) -> Self {
        self.skip = None;
        self.take = None;
        self
    }

    /// Marks results as read-only. Never changes what is returned.
    pub fn no_tracking(mut self) -> Self {
        self.tracking_disabled = true;
        self
    }

    /// Sets the projection, replacing any earlier one.
    pub fn select<Q, F>(self, projection: F) -> SpecificationBuilder<E, Q>
    where
        F: Fn(&E) -> Q + Send + Sync + 'static,
    {
        SpecificationBuilder {
            criteria: self.criteria,
            includes: self.includes,
            orderings: self.orderings,
            skip: self.skip,
            take: self.take,
            projection: Some(Arc::new(projection)),
            tracking_disabled: self.tracking_disabled,
        }
    }

    /// Finalizes the builder into an immutable Specification.
    pub fn build(self) -> Specification<E, P> {
        Specification {
            parts: Arc::new(SpecificationParts {
                criteria: self.criteria,
                includes: self.includes,
                orderings: self.orderings,
                skip: self.skip,
                take: self.take,
                tracking_disabled: self.tracking_disabled,
            }),
            projection: self.projection,
        }
    }
}

impl<E, P> fmt::Debug for SpecificationBuilder<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationBuilder")
            .field("criteria", &self.criteria)
            .field("includes", &self.includes)
            .field("orderings", &self.orderings)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("has_projection", &self.projection.is_some())
            .field("tracking_disabled", &self.tracking_disabled)
            .finish()
    }
}

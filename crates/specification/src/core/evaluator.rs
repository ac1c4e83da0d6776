//! The evaluator abstraction.
//!
//! An [`Evaluator`] interprets a [`Specification`] against one kind of data
//! source. Every implementation must return the same ordered entities and the
//! same counts for the same Specification and dataset; only the way it gets
//! there differs (SQL translation vs. direct iteration).

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::specification::Specification;

use super::backend::BackendKind;
use super::cancel::CancellationToken;
use super::entity::Entity;

/// How much of a Specification to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Criteria, includes, ordering and paging.
    #[default]
    Full,
    /// Criteria only. Includes, ordering, paging and projection are ignored
    /// and paging values are not validated.
    CriteriaOnly,
}

/// Interprets Specifications against a data source.
///
/// The evaluator returns entities; the projection stage is applied by the
/// caller through [`Specification::project`]. Projection maps each entity
/// independently, so applying it after the paging window yields the same
/// sequence as applying it before.
///
/// # Errors
///
/// * `EvaluationError::InvalidPaging` - negative `skip` or `take` in
///   [`EvaluationMode::Full`]
/// * `EvaluationError::UnsupportedExpression` - a part of the Specification
///   has no native form in this backend (persisted stores only)
/// * `EvaluationError::Cancelled` - the token fired before completion
/// * `StorageError::Backend` - the store itself failed
#[async_trait]
pub trait Evaluator<E: Entity>: Send + Sync + Debug {
    /// The data source this evaluator reads.
    type Source: Send + Sync;

    /// Returns the kind of backend.
    fn kind(&self) -> BackendKind;

    /// Evaluates the Specification and returns matching entities.
    async fn evaluate<P>(
        &self,
        source: &Self::Source,
        spec: &Specification<E, P>,
        mode: EvaluationMode,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<E>>
    where
        P: Send + Sync + 'static;

    /// Counts the entities matching the criteria, ignoring everything else.
    async fn count<P>(
        &self,
        source: &Self::Source,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<u64>
    where
        P: Send + Sync + 'static,
    {
        let rows = self
            .evaluate(source, spec, EvaluationMode::CriteriaOnly, cancel)
            .await?;
        Ok(rows.len() as u64)
    }
}

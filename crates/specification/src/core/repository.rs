//! The read-side repository contract.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::specification::Specification;
use crate::types::PagedResult;

use super::cancel::CancellationToken;
use super::entity::Entity;

/// Specification-driven read operations for one entity type.
///
/// Implementations never treat "no results" as an error: absence is an empty
/// sequence, `None`, or a zero count. Errors raised by the evaluator are
/// passed through unchanged and never retried.
///
/// Every operation takes an optional [`CancellationToken`] that the
/// underlying evaluator honors while a query is in flight.
///
/// # Example
///
/// ```ignore
/// use helios_specification::core::ReadRepository;
///
/// async fn newest_customers<R: ReadRepository<Customer>>(
///     repository: &R,
/// ) -> StorageResult<Vec<Customer>> {
///     let spec = Specification::builder()
///         .order_by_desc("created_at")
///         .take(10)
///         .build();
///     repository.find(&spec, None).await
/// }
/// ```
#[async_trait]
pub trait ReadRepository<E: Entity>: Send + Sync {
    /// Runs the full pipeline and returns the entities.
    ///
    /// A projection on the Specification is ignored here; see
    /// [`find_projected`](Self::find_projected).
    async fn find<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<E>>
    where
        P: Send + Sync + 'static;

    /// Returns the first entity in pipeline order, if any.
    async fn find_one<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Option<E>>
    where
        P: Send + Sync + 'static;

    /// Counts the entities matching the criteria. Includes, ordering,
    /// projection and paging are ignored.
    async fn count<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<u64>
    where
        P: Send + Sync + 'static;

    /// Returns true if at least one entity matches the criteria.
    async fn exists<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<bool>
    where
        P: Send + Sync + 'static,
    {
        Ok(self.count(spec, cancel).await? > 0)
    }

    /// Returns one page of entities plus the total matching count.
    ///
    /// `page_size` is the Specification's `take` when set, otherwise the
    /// number of items returned.
    async fn find_paged<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<PagedResult<E>>
    where
        P: Send + Sync + 'static;

    /// Runs the full pipeline and returns projected values.
    ///
    /// Fails with `MissingProjection` when the Specification has none.
    async fn find_projected<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<P>>
    where
        P: Send + Sync + 'static;

    /// Returns the first projected value in pipeline order, if any.
    ///
    /// Fails with `MissingProjection` when the Specification has none.
    async fn find_one_projected<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Option<P>>
    where
        P: Send + Sync + 'static;
}

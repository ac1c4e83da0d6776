//! Repository façade over an evaluator.
//!
//! [`Repository`] binds one data source to one [`Evaluator`] and implements
//! [`ReadRepository`] on top of it. Which backend serves a repository is
//! decided by the type it is constructed with, never at runtime:
//!
//! ```
//! # use serde::{Deserialize, Serialize};
//! # use helios_specification::core::Entity;
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Customer { id: String, name: String }
//! # impl Entity for Customer {
//! #     const COLLECTION: &'static str = "customers";
//! #     fn id(&self) -> String { self.id.clone() }
//! # }
//! use std::sync::Arc;
//!
//! use helios_specification::backends::memory::InMemoryStore;
//! use helios_specification::core::ReadRepository;
//! use helios_specification::repository::InMemoryRepository;
//! use helios_specification::specification::Specification;
//!
//! # tokio_test_block(async {
//! let store = Arc::new(InMemoryStore::new());
//! store.put(Customer { id: "c1".into(), name: "Ada".into() });
//!
//! let repository = InMemoryRepository::in_memory(store);
//! let spec = Specification::builder().order_by_asc("name").build();
//! let customers = repository.find(&spec, None).await.unwrap();
//! assert_eq!(customers.len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::backends::memory::{InMemoryEvaluator, InMemoryStore};
#[cfg(feature = "sqlite")]
use crate::backends::sqlite::{SqliteEvaluator, SqliteStore};
use crate::core::{
    BackendKind, CancellationToken, Entity, EvaluationMode, Evaluator, ReadRepository,
};
use crate::error::{EvaluationError, StorageResult};
use crate::specification::Specification;
use crate::types::{PageMetadata, PagedResult};

/// A read repository for entities of type `E`, evaluated by `V`.
pub struct Repository<E, V>
where
    E: Entity,
    V: Evaluator<E>,
{
    source: Arc<V::Source>,
    evaluator: V,
    _entity: PhantomData<fn() -> E>,
}

/// A repository over an [`InMemoryStore`].
pub type InMemoryRepository<E> = Repository<E, InMemoryEvaluator>;

/// A repository over a [`SqliteStore`].
#[cfg(feature = "sqlite")]
pub type SqliteRepository<E> = Repository<E, SqliteEvaluator>;

impl<E, V> Repository<E, V>
where
    E: Entity,
    V: Evaluator<E>,
{
    /// Creates a repository from a source and an evaluator.
    pub fn new(source: Arc<V::Source>, evaluator: V) -> Self {
        Self {
            source,
            evaluator,
            _entity: PhantomData,
        }
    }

    /// Returns the data source.
    pub fn source(&self) -> &Arc<V::Source> {
        &self.source
    }

    /// Returns the evaluator.
    pub fn evaluator(&self) -> &V {
        &self.evaluator
    }

    /// Returns the kind of backend serving this repository.
    pub fn kind(&self) -> BackendKind {
        self.evaluator.kind()
    }
}

impl<E: Entity> Repository<E, InMemoryEvaluator> {
    /// Creates a repository over an in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore<E>>) -> Self {
        Self::new(store, InMemoryEvaluator::new())
    }
}

#[cfg(feature = "sqlite")]
impl<E: Entity> Repository<E, SqliteEvaluator> {
    /// Creates a repository over a SQLite store.
    pub fn sqlite(store: Arc<SqliteStore>) -> Self {
        Self::new(store, SqliteEvaluator::new())
    }
}

impl<E, V> Clone for Repository<E, V>
where
    E: Entity,
    V: Evaluator<E> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            evaluator: self.evaluator.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, V> fmt::Debug for Repository<E, V>
where
    E: Entity,
    V: Evaluator<E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &E::COLLECTION)
            .field("evaluator", &self.evaluator)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<E, V> ReadRepository<E> for Repository<E, V>
where
    E: Entity,
    V: Evaluator<E>,
{
    #[instrument(
        skip(self, spec, cancel),
        fields(collection = E::COLLECTION, backend = %self.kind(), tracking = !spec.is_tracking_disabled())
    )]
    async fn find<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<E>>
    where
        P: Send + Sync + 'static,
    {
        self.evaluator
            .evaluate(&self.source, spec, EvaluationMode::Full, cancel)
            .await
    }

    #[instrument(
        skip(self, spec, cancel),
        fields(collection = E::COLLECTION, backend = %self.kind(), tracking = !spec.is_tracking_disabled())
    )]
    async fn find_one<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Option<E>>
    where
        P: Send + Sync + 'static,
    {
        let first = spec.first_only();
        let rows = self
            .evaluator
            .evaluate(&self.source, &first, EvaluationMode::Full, cancel)
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, spec, cancel), fields(collection = E::COLLECTION, backend = %self.kind()))]
    async fn count<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<u64>
    where
        P: Send + Sync + 'static,
    {
        self.evaluator.count(&self.source, spec, cancel).await
    }

    #[instrument(
        skip(self, spec, cancel),
        fields(collection = E::COLLECTION, backend = %self.kind(), tracking = !spec.is_tracking_disabled())
    )]
    async fn find_paged<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<PagedResult<E>>
    where
        P: Send + Sync + 'static,
    {
        let window = spec.paging_window()?;
        let total_count = self.count(spec, cancel).await?;
        let items = self.find(spec, cancel).await?;

        let page_size = window.take.unwrap_or(items.len() as u64);
        let metadata = PageMetadata::calculate(total_count, window.skip, page_size);
        debug!(
            total_count,
            page_number = metadata.page_number,
            total_pages = metadata.total_pages,
            "Paged query complete"
        );
        Ok(PagedResult::new(items, total_count, metadata))
    }

    #[instrument(
        skip(self, spec, cancel),
        fields(collection = E::COLLECTION, backend = %self.kind(), tracking = !spec.is_tracking_disabled())
    )]
    async fn find_projected<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<P>>
    where
        P: Send + Sync + 'static,
    {
        if !spec.has_projection() {
            return Err(EvaluationError::MissingProjection.into());
        }
        let rows = self.find(spec, cancel).await?;
        Ok(spec.project(rows)?)
    }

    #[instrument(
        skip(self, spec, cancel),
        fields(collection = E::COLLECTION, backend = %self.kind(), tracking = !spec.is_tracking_disabled())
    )]
    async fn find_one_projected<P>(
        &self,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Option<P>>
    where
        P: Send + Sync + 'static,
    {
        if !spec.has_projection() {
            return Err(EvaluationError::MissingProjection.into());
        }
        let row = self.find_one(spec, cancel).await?;
        Ok(spec.project(row.into_iter().collect())?.into_iter().next())
    }
}

//! SQLite Specification evaluator.

use std::time::Duration;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::core::cancel::check_cancelled;
use crate::core::{BackendKind, CancellationToken, Entity, EvaluationMode, Evaluator};
use crate::error::{BackendError, EvaluationError, StorageError, StorageResult};
use crate::specification::Specification;

use super::backend::{SqliteStore, join_document};
use super::query_builder::SqlTranslator;

/// How often an interrupted query is re-signalled until it stops.
const INTERRUPT_POLL: Duration = Duration::from_millis(10);

/// Evaluates Specifications as SQL against a [`SqliteStore`].
///
/// Every Specification becomes a single parameterized statement; filtering,
/// relation loading, ordering and paging all run inside SQLite. Queries run
/// on tokio's blocking pool. When a [`CancellationToken`] fires mid-query the
/// connection is interrupted and the evaluation returns `Cancelled`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEvaluator;

impl SqliteEvaluator {
    /// Creates an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Runs `query` on a pooled connection, honoring cancellation.
    async fn run<T, F>(
        &self,
        store: &SqliteStore,
        cancel: Option<&CancellationToken>,
        query: F,
    ) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        check_cancelled(cancel)?;

        let conn = store.get_connection()?;
        let interrupt = conn.get_interrupt_handle();
        let mut task: JoinHandle<StorageResult<T>> =
            tokio::task::spawn_blocking(move || query(&conn));

        let Some(token) = cancel else {
            return join(task.await);
        };

        tokio::select! {
            outcome = &mut task => join(outcome),
            _ = token.cancelled() => {
                // The statement may not have started yet when the first
                // interrupt lands, so keep signalling until the task ends and
                // the connection is back in the pool.
                loop {
                    interrupt.interrupt();
                    if tokio::time::timeout(INTERRUPT_POLL, &mut task).await.is_ok() {
                        break;
                    }
                }
                warn!("SQLite evaluation cancelled");
                Err(EvaluationError::Cancelled.into())
            }
        }
    }
}

fn join<T>(outcome: Result<StorageResult<T>, tokio::task::JoinError>) -> StorageResult<T> {
    outcome.map_err(|e| {
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: format!("Query task failed: {}", e),
            source: Some(Box::new(e)),
        })
    })?
}

#[async_trait]
impl<E: Entity> Evaluator<E> for SqliteEvaluator {
    type Source = SqliteStore;

    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    #[instrument(skip(self, source, spec, cancel), fields(collection = E::COLLECTION, mode = ?mode))]
    async fn evaluate<P>(
        &self,
        source: &SqliteStore,
        spec: &Specification<E, P>,
        mode: EvaluationMode,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<E>>
    where
        P: Send + Sync + 'static,
    {
        let window = match mode {
            EvaluationMode::Full => Some(spec.paging_window()?),
            EvaluationMode::CriteriaOnly => None,
        };
        let (fragment, included) = SqlTranslator::<E>::new().select(spec, window)?;
        debug!(sql = %fragment.sql, params = ?fragment.params, "Executing specification query");

        let entities = self
            .run(source, cancel, move |conn| {
                let mut stmt = conn.prepare(&fragment.sql)?;
                let rows: Vec<(String, Vec<(String, Option<String>)>)> = stmt
                    .query_map(fragment.param_refs().as_slice(), |row| {
                        let data: String = row.get(1)?;
                        let mut relations = Vec::with_capacity(included.len());
                        for (offset, relation) in included.iter().enumerate() {
                            relations.push((relation.clone(), row.get(2 + offset)?));
                        }
                        Ok((data, relations))
                    })?
                    .collect::<Result<_, _>>()?;

                rows.into_iter()
                    .map(|(data, relations)| join_document::<E>(&data, relations))
                    .collect::<StorageResult<Vec<E>>>()
            })
            .await?;

        debug!(rows = entities.len(), "SQLite evaluation complete");
        Ok(entities)
    }

    #[instrument(skip(self, source, spec, cancel), fields(collection = E::COLLECTION))]
    async fn count<P>(
        &self,
        source: &SqliteStore,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<u64>
    where
        P: Send + Sync + 'static,
    {
        let fragment = SqlTranslator::<E>::new().count(spec)?;
        debug!(sql = %fragment.sql, params = ?fragment.params, "Executing count query");

        self.run(source, cancel, move |conn| {
            let count: i64 =
                conn.query_row(&fragment.sql, fragment.param_refs().as_slice(), |row| {
                    row.get(0)
                })?;
            Ok(count as u64)
        })
        .await
    }
}

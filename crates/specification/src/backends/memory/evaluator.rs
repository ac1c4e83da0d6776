//! In-memory Specification evaluator.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::cancel::check_cancelled;
use crate::core::{BackendKind, CancellationToken, Entity, EvaluationMode, Evaluator};
use crate::error::StorageResult;
use crate::specification::{OrderBy, Specification};
use crate::types::ScalarValue;

use super::store::InMemoryStore;

/// One matched entity with its precomputed sort keys.
struct SortRow<'a, E> {
    keys: Vec<ScalarValue>,
    id: String,
    entity: &'a E,
}

/// Runs Specifications directly over a slice of entities.
///
/// Criteria, ordering and null handling follow SQLite's rules so that
/// results line up with [`SqliteEvaluator`](crate::backends::sqlite::SqliteEvaluator)
/// for the same dataset. Unlike the SQL evaluator, it accepts custom criteria
/// and computed ordering keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryEvaluator;

impl InMemoryEvaluator {
    /// Creates an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluates a Specification over a slice of entities.
    pub fn evaluate_rows<E, P>(
        &self,
        rows: &[E],
        spec: &Specification<E, P>,
        mode: EvaluationMode,
    ) -> StorageResult<Vec<E>>
    where
        E: Entity,
    {
        let window = match mode {
            EvaluationMode::Full => Some(spec.paging_window()?),
            EvaluationMode::CriteriaOnly => None,
        };

        let matched = filter_rows(rows, spec)?;

        let Some(window) = window else {
            let mut matched: Vec<(String, &E)> = matched
                .into_iter()
                .map(|(entity, _)| (entity.id(), entity))
                .collect();
            matched.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            return Ok(matched.into_iter().map(|(_, entity)| entity.clone()).collect());
        };

        // Relations are already materialized on in-memory entities, so there
        // is nothing to do for includes.

        let mut sorted: Vec<SortRow<'_, E>> = matched
            .into_iter()
            .map(|(entity, document)| SortRow {
                keys: spec
                    .orderings()
                    .iter()
                    .map(|order| order.key.extract(entity, &document))
                    .collect(),
                id: entity.id(),
                entity,
            })
            .collect();
        sorted.sort_by(|a, b| compare_rows(spec.orderings(), a, b));

        Ok(window
            .apply(sorted)
            .into_iter()
            .map(|row| row.entity.clone())
            .collect())
    }

    /// Counts the entities matching the criteria.
    pub fn count_rows<E, P>(&self, rows: &[E], spec: &Specification<E, P>) -> StorageResult<u64>
    where
        E: Entity,
    {
        Ok(filter_rows(rows, spec)?.len() as u64)
    }
}

fn filter_rows<'a, E, P>(
    rows: &'a [E],
    spec: &Specification<E, P>,
) -> StorageResult<Vec<(&'a E, Value)>>
where
    E: Entity,
{
    let mut matched = Vec::new();
    for entity in rows {
        let document = serde_json::to_value(entity)?;
        if spec.is_satisfied_by(entity, &document) {
            matched.push((entity, document));
        }
    }
    Ok(matched)
}

fn compare_rows<E>(orderings: &[OrderBy<E>], a: &SortRow<'_, E>, b: &SortRow<'_, E>) -> Ordering {
    for (index, order) in orderings.iter().enumerate() {
        let ordering = order.direction.apply(a.keys[index].sort_cmp(&b.keys[index]));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.id.as_bytes().cmp(b.id.as_bytes())
}

#[async_trait]
impl<E: Entity> Evaluator<E> for InMemoryEvaluator {
    type Source = InMemoryStore<E>;

    fn kind(&self) -> BackendKind {
        BackendKind::InMemory
    }

    #[instrument(skip(self, source, spec, cancel), fields(collection = E::COLLECTION, mode = ?mode))]
    async fn evaluate<P>(
        &self,
        source: &InMemoryStore<E>,
        spec: &Specification<E, P>,
        mode: EvaluationMode,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<Vec<E>>
    where
        P: Send + Sync + 'static,
    {
        check_cancelled(cancel)?;
        let rows = source.read(|rows| self.evaluate_rows(rows, spec, mode))?;
        debug!(rows = rows.len(), "In-memory evaluation complete");
        Ok(rows)
    }

    #[instrument(skip(self, source, spec, cancel), fields(collection = E::COLLECTION))]
    async fn count<P>(
        &self,
        source: &InMemoryStore<E>,
        spec: &Specification<E, P>,
        cancel: Option<&CancellationToken>,
    ) -> StorageResult<u64>
    where
        P: Send + Sync + 'static,
    {
        check_cancelled(cancel)?;
        source.read(|rows| self.count_rows(rows, spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EvaluationError, StorageError};
    use crate::specification::{Criterion, OrderKey};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: String,
        name: String,
        price: Option<f64>,
        stock: i64,
    }

    impl Entity for Product {
        const COLLECTION: &'static str = "products";

        fn id(&self) -> String {
            self.id.clone()
        }
    }

    fn product(id: &str, name: &str, price: Option<f64>, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price,
            stock,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("p3", "Widget", Some(9.5), 4),
            product("p1", "Gadget", None, 0),
            product("p2", "Widget", Some(3.0), 12),
            product("p4", "Doohickey", Some(9.5), 7),
        ]
    }

    fn ids(rows: &[Product]) -> Vec<&str> {
        rows.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_no_ordering_falls_back_to_id() {
        let spec = Specification::all();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &spec, EvaluationMode::Full)
            .unwrap();
        assert_eq!(ids(&rows), vec!["p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn test_nulls_first_ascending_last_descending() {
        let asc = Specification::builder().order_by_asc("price").build();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &asc, EvaluationMode::Full)
            .unwrap();
        assert_eq!(ids(&rows), vec!["p1", "p2", "p3", "p4"]);

        let desc = Specification::builder().order_by_desc("price").build();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &desc, EvaluationMode::Full)
            .unwrap();
        // Equal prices keep the ascending id tie-break.
        assert_eq!(ids(&rows), vec!["p3", "p4", "p2", "p1"]);
    }

    #[test]
    fn test_multi_key_ordering() {
        let spec = Specification::builder()
            .order_by_asc("name")
            .order_by_desc("stock")
            .build();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &spec, EvaluationMode::Full)
            .unwrap();
        assert_eq!(ids(&rows), vec!["p4", "p1", "p2", "p3"]);
    }

    #[test]
    fn test_filter_then_page() {
        let spec = Specification::builder()
            .filter(Criterion::gt("stock", 0))
            .order_by_asc("stock")
            .skip(1)
            .take(1)
            .build();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &spec, EvaluationMode::Full)
            .unwrap();
        assert_eq!(ids(&rows), vec!["p4"]);
    }

    #[test]
    fn test_null_never_matches_comparison() {
        let spec = Specification::builder()
            .filter(Criterion::ne("price", 3.0))
            .build();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &spec, EvaluationMode::Full)
            .unwrap();
        assert_eq!(ids(&rows), vec!["p3", "p4"]);
    }

    #[test]
    fn test_custom_criterion_and_computed_key() {
        let spec = Specification::builder()
            .filter(Criterion::custom("in_stock", |p: &Product| p.stock > 0))
            .order_by(
                OrderKey::computed("name_len", |p: &Product| {
                    ScalarValue::Integer(p.name.len() as i64)
                }),
                crate::specification::SortDirection::Ascending,
            )
            .build();
        let rows = InMemoryEvaluator::new()
            .evaluate_rows(&catalog(), &spec, EvaluationMode::Full)
            .unwrap();
        assert_eq!(ids(&rows), vec!["p2", "p3", "p4"]);
    }

    #[test]
    fn test_criteria_only_ignores_invalid_paging() {
        let spec = Specification::builder()
            .filter(Criterion::eq("name", "Widget"))
            .skip(-1)
            .build();
        let evaluator = InMemoryEvaluator::new();

        let err = evaluator
            .evaluate_rows(&catalog(), &spec, EvaluationMode::Full)
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Evaluation(EvaluationError::InvalidPaging { .. })
        ));

        let rows = evaluator
            .evaluate_rows(&catalog(), &spec, EvaluationMode::CriteriaOnly)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(evaluator.count_rows(&catalog(), &spec).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_evaluate_checks_cancellation_first() {
        let store = InMemoryStore::with_entities(catalog());
        let token = CancellationToken::new();
        token.cancel();

        let err = InMemoryEvaluator::new()
            .evaluate(&store, &Specification::<Product>::all(), EvaluationMode::Full, Some(&token))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}

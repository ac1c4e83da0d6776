//! In-memory store integration tests.

mod common;

use std::sync::Arc;

use helios_specification::backends::memory::{InMemoryEvaluator, InMemoryStore};
use helios_specification::core::{BackendKind, EvaluationMode, ReadRepository};
use helios_specification::repository::InMemoryRepository;
use helios_specification::specification::{Criterion, OrderKey, SortDirection, Specification};
use helios_specification::types::ScalarValue;

use common::*;

#[tokio::test]
async fn test_repository_reports_backend_kind() {
    let ctx = TestContext::new();
    assert_eq!(ctx.memory.kind(), BackendKind::InMemory);
    assert_eq!(ctx.sqlite.kind(), BackendKind::Sqlite);
}

#[tokio::test]
async fn test_store_updates_are_visible() {
    let store = Arc::new(InMemoryStore::<Customer>::new());
    let repository = InMemoryRepository::in_memory(store.clone());
    let spec = Specification::builder().order_by_desc("balance").build();

    store.put_all(customers().into_iter().take(3));
    assert_eq!(repository.count(&spec, None).await.unwrap(), 3);

    store.put(customers()[0].clone().with_balance(10_000.0));
    let first = repository.find_one(&spec, None).await.unwrap().unwrap();
    assert_eq!(first.id, "cust-01");
    assert_eq!(store.len(), 3);

    assert!(store.remove("cust-01"));
    assert_eq!(repository.count(&spec, None).await.unwrap(), 2);

    store.clear();
    assert!(store.is_empty());
    assert!(repository.find(&spec, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_snapshot_is_detached() {
    let store = InMemoryStore::with_entities(customers());
    let snapshot = store.snapshot();
    store.clear();
    assert_eq!(snapshot.len(), 25);
    assert!(store.is_empty());
}

#[test]
fn test_evaluate_rows_over_plain_slice() {
    let rows = customers();
    let spec = Specification::builder()
        .filter(Criterion::custom("vip", |c: &Customer| {
            c.tags.iter().any(|t| t == "vip")
        }))
        .order_by(
            OrderKey::computed("tag_count", |c: &Customer| {
                ScalarValue::Integer(c.tags.len() as i64)
            }),
            SortDirection::Descending,
        )
        .order_by_desc("name")
        .build();

    let result = InMemoryEvaluator::new()
        .evaluate_rows(&rows, &spec, EvaluationMode::Full)
        .unwrap();
    assert_eq!(
        result.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["Zuse", "Tim", "Margaret", "Grace", "Ada"]
    );
}

#[test]
fn test_criteria_only_returns_id_order() {
    let rows: Vec<Customer> = customers().into_iter().rev().collect();
    let spec = Specification::builder()
        .filter(Criterion::eq("address.country", "UK"))
        .order_by_desc("name")
        .take(1)
        .build();

    let result = InMemoryEvaluator::new()
        .evaluate_rows(&rows, &spec, EvaluationMode::CriteriaOnly)
        .unwrap();
    assert_eq!(
        ids(&result),
        vec!["cust-01", "cust-05", "cust-09", "cust-13", "cust-17", "cust-21", "cust-25"]
    );
}

#[tokio::test]
async fn test_includes_are_noops_in_memory() {
    let ctx = TestContext::new();
    let spec = Specification::builder()
        .filter(Criterion::eq("id", "cust-03"))
        .include("invoices")
        .build();

    let customer = ctx.memory.find_one(&spec, None).await.unwrap().unwrap();
    assert_eq!(customer.orders.len(), 2);
}

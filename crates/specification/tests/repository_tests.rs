//! Repository façade tests, run against both backends.

mod common;

use helios_specification::core::ReadRepository;
use helios_specification::error::{EvaluationError, StorageError};
use helios_specification::specification::{Criterion, Specification};

use common::*;

// ============================================================================
// find / find_one
// ============================================================================

#[tokio::test]
async fn test_find_returns_empty_for_no_match() {
    let ctx = TestContext::new();
    let spec = Specification::builder()
        .filter(Criterion::eq("tier", "platinum"))
        .build();

    assert!(ctx.memory.find(&spec, None).await.unwrap().is_empty());
    assert!(ctx.sqlite.find(&spec, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_one_absent_is_none() {
    let ctx = TestContext::new();
    let spec = Specification::builder()
        .filter(Criterion::gt("age", 1000))
        .build();

    assert!(ctx.memory.find_one(&spec, None).await.unwrap().is_none());
    assert!(ctx.sqlite.find_one(&spec, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_one_is_first_of_find() {
    let ctx = TestContext::new();
    let spec = premium_customers_with_orders();

    let all = ctx.sqlite.find(&spec, None).await.unwrap();
    let first = ctx.sqlite.find_one(&spec, None).await.unwrap();
    assert_eq!(first.as_ref(), all.first());

    let memory_first = ctx.memory.find_one(&spec, None).await.unwrap();
    assert_eq!(memory_first, first);
}

#[tokio::test]
async fn test_find_one_with_take_zero_is_none() {
    let ctx = TestContext::new();
    let spec = Specification::builder().take(0).build();
    assert!(ctx.sqlite.find_one(&spec, None).await.unwrap().is_none());
    assert!(ctx.memory.find_one(&spec, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_includes_load_relations() {
    let ctx = TestContext::new();
    let spec = Specification::builder()
        .filter(Criterion::eq("id", "cust-03"))
        .include("orders")
        .include("orders")
        .build();
    assert_eq!(spec.includes().len(), 1);

    let customer = ctx.sqlite.find_one(&spec, None).await.unwrap().unwrap();
    assert_eq!(customer.orders.len(), 2);
    assert_eq!(customer.orders[0].number, "ORD-03-1");

    let without = Specification::builder()
        .filter(Criterion::eq("id", "cust-03"))
        .build();
    let customer = ctx.sqlite.find_one(&without, None).await.unwrap().unwrap();
    assert!(customer.orders.is_empty());
}

// ============================================================================
// count / exists
// ============================================================================

#[tokio::test]
async fn test_count_ignores_everything_but_criteria() {
    let ctx = TestContext::new();
    let plain = Specification::builder()
        .filter(Criterion::eq("active", true))
        .build();
    let decorated = plain
        .to_builder()
        .include("orders")
        .order_by_desc("balance")
        .skip(3)
        .take(2)
        .no_tracking()
        .build();

    for repo_count in [
        ctx.memory.count(&decorated, None).await.unwrap(),
        ctx.sqlite.count(&decorated, None).await.unwrap(),
    ] {
        assert_eq!(repo_count, ctx.sqlite.count(&plain, None).await.unwrap());
    }
}

#[tokio::test]
async fn test_count_matches_unpaged_find() {
    let ctx = TestContext::new();
    let spec = customers_in_city("London").to_builder().take(1).build();

    let count = ctx.sqlite.count(&spec, None).await.unwrap();
    let unpaged = ctx.sqlite.find(&spec.without_paging(), None).await.unwrap();
    assert_eq!(count, unpaged.len() as u64);
    assert_eq!(count, 7);
}

#[tokio::test]
async fn test_exists() {
    let ctx = TestContext::new();
    assert!(ctx.sqlite.exists(&customers_without_email(), None).await.unwrap());
    assert!(ctx.memory.exists(&customers_without_email(), None).await.unwrap());

    let nobody = Specification::builder()
        .filter(Criterion::starts_with("name", "Q"))
        .build();
    assert!(!ctx.sqlite.exists(&nobody, None).await.unwrap());
    assert!(!ctx.memory.exists(&nobody, None).await.unwrap());
}

// ============================================================================
// Projection
// ============================================================================

#[tokio::test]
async fn test_find_projected() {
    let ctx = TestContext::new();
    let spec = example_domain_names();

    let memory = ctx.memory.find_projected(&spec, None).await.unwrap();
    let sqlite = ctx.sqlite.find_projected(&spec, None).await.unwrap();
    assert_eq!(memory, sqlite);
    assert_eq!(sqlite.len(), 17);
    assert_eq!(sqlite[0], "Ada");

    let one = ctx.sqlite.find_one_projected(&spec, None).await.unwrap();
    assert_eq!(one.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_projected_requires_projection() {
    let ctx = TestContext::new();
    let spec = active_customers_by_name();

    for err in [
        ctx.memory.find_projected(&spec, None).await.unwrap_err(),
        ctx.sqlite.find_projected(&spec, None).await.unwrap_err(),
        ctx.memory.find_one_projected(&spec, None).await.unwrap_err(),
        ctx.sqlite.find_one_projected(&spec, None).await.unwrap_err(),
    ] {
        assert!(matches!(
            err,
            StorageError::Evaluation(EvaluationError::MissingProjection)
        ));
    }
}

#[tokio::test]
async fn test_projection_sees_included_relations() {
    let ctx = TestContext::new();
    let spec = premium_customers_with_orders()
        .to_builder()
        .select(|customer: &Customer| (customer.id.clone(), customer.orders.len()))
        .build();

    let memory = ctx.memory.find_projected(&spec, None).await.unwrap();
    let sqlite = ctx.sqlite.find_projected(&spec, None).await.unwrap();
    assert_eq!(memory, sqlite);
    assert!(sqlite.iter().any(|(_, orders)| *orders > 0));
}

// ============================================================================
// Builder semantics
// ============================================================================

#[tokio::test]
async fn test_repeated_filters_are_anded() {
    let ctx = TestContext::new();
    let chained = Specification::builder()
        .filter(Criterion::eq("active", true))
        .filter(Criterion::eq("tier", "gold"))
        .build();
    let combined = Specification::builder()
        .filter_all([
            Criterion::eq("active", true),
            Criterion::eq("tier", "gold"),
        ])
        .build();

    let chained_rows = ctx.sqlite.find(&chained, None).await.unwrap();
    let combined_rows = ctx.sqlite.find(&combined, None).await.unwrap();
    assert_eq!(chained_rows, combined_rows);
    assert!(
        chained_rows
            .iter()
            .all(|c| c.active && c.tier == "gold")
    );
}

#[tokio::test]
async fn test_last_paging_call_wins() {
    let ctx = TestContext::new();
    let spec = Specification::builder()
        .order_by_asc("id")
        .take(3)
        .take(2)
        .skip(10)
        .skip(1)
        .build();

    let rows = ctx.memory.find(&spec, None).await.unwrap();
    assert_eq!(ids(&rows), vec!["cust-02", "cust-03"]);
}

#[tokio::test]
async fn test_tracking_flag_does_not_change_results() {
    let ctx = TestContext::new();
    let tracked = premium_customers_with_orders();
    let untracked = tracked.to_builder().no_tracking().build();

    assert_eq!(
        ctx.sqlite.find(&tracked, None).await.unwrap(),
        ctx.sqlite.find(&untracked, None).await.unwrap()
    );
    assert_eq!(
        ctx.memory.find(&tracked, None).await.unwrap(),
        ctx.memory.find(&untracked, None).await.unwrap()
    );
}

#[tokio::test]
async fn test_shared_specification_across_tasks() {
    let ctx = std::sync::Arc::new(TestContext::new());
    let spec = active_customers_by_name();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = ctx.clone();
            let spec = spec.clone();
            tokio::spawn(async move { ctx.sqlite.find(&spec, None).await.unwrap() })
        })
        .collect();

    let expected = ctx.memory.find(&spec, None).await.unwrap();
    for handle in handles {
        assert_eq!(as_loaded(handle.await.unwrap(), &spec), as_loaded(expected.clone(), &spec));
    }
}

//! Seeds both backends with the same dataset and compares their answers.

use std::sync::Arc;

use helios_specification::backends::memory::InMemoryStore;
use helios_specification::backends::sqlite::SqliteStore;
use helios_specification::core::{Entity, ReadRepository};
use helios_specification::repository::{InMemoryRepository, SqliteRepository};
use helios_specification::specification::Specification;
use helios_specification::types::PagedResult;

use super::fixtures::{Customer, customers};

/// The same dataset loaded into every backend.
pub struct TestContext {
    pub memory: InMemoryRepository<Customer>,
    pub sqlite: SqliteRepository<Customer>,
    pub dataset: Vec<Customer>,
}

impl TestContext {
    /// Creates a context seeded with the standard 25 customers.
    pub fn new() -> Self {
        Self::with_dataset(customers())
    }

    /// Creates a context seeded with the given customers.
    pub fn with_dataset(dataset: Vec<Customer>) -> Self {
        let memory_store = Arc::new(InMemoryStore::with_entities(dataset.clone()));

        let sqlite_store = SqliteStore::in_memory().expect("Failed to create SQLite store");
        sqlite_store
            .init_schema()
            .expect("Failed to initialize schema");
        sqlite_store
            .put_all(&dataset)
            .expect("Failed to seed SQLite store");

        Self {
            memory: InMemoryRepository::in_memory(memory_store),
            sqlite: SqliteRepository::sqlite(Arc::new(sqlite_store)),
            dataset,
        }
    }
}

/// Drops relations the Specification did not include.
///
/// In-memory entities always carry their relations; the SQLite store only
/// loads the ones that were included. Comparing results therefore happens on
/// the shape the persisted store is asked to produce.
pub fn as_loaded<P>(rows: Vec<Customer>, spec: &Specification<Customer, P>) -> Vec<Customer> {
    if spec.includes().iter().any(|r| Customer::is_relation(r)) {
        rows
    } else {
        rows.into_iter().map(Customer::without_orders).collect()
    }
}

/// Returns the ids of the rows, in order.
pub fn ids(rows: &[Customer]) -> Vec<String> {
    rows.iter().map(|c| c.id.clone()).collect()
}

/// Asserts that both backends return the same entities and counts.
pub async fn assert_equivalent<P>(ctx: &TestContext, spec: &Specification<Customer, P>)
where
    P: Send + Sync + 'static,
{
    let memory = ctx.memory.find(spec, None).await.expect("in-memory find");
    let sqlite = ctx.sqlite.find(spec, None).await.expect("sqlite find");
    assert_eq!(as_loaded(memory, spec), sqlite, "find differs for {:?}", spec);

    let memory_count = ctx.memory.count(spec, None).await.expect("in-memory count");
    let sqlite_count = ctx.sqlite.count(spec, None).await.expect("sqlite count");
    assert_eq!(memory_count, sqlite_count, "count differs for {:?}", spec);

    let memory_page = ctx.memory.find_paged(spec, None).await.expect("in-memory page");
    let sqlite_page = ctx.sqlite.find_paged(spec, None).await.expect("sqlite page");
    assert_same_page(memory_page, sqlite_page, spec);
}

fn assert_same_page<P>(
    memory: PagedResult<Customer>,
    sqlite: PagedResult<Customer>,
    spec: &Specification<Customer, P>,
) {
    assert_eq!(memory.metadata(), sqlite.metadata(), "page differs for {:?}", spec);
    assert_eq!(memory.total_count, sqlite.total_count);
    assert_eq!(as_loaded(memory.items, spec), sqlite.items);
}

//! In-memory entity store.

use std::fmt;

use parking_lot::RwLock;

use crate::core::Entity;

/// A collection of entities kept in insertion order.
///
/// Evaluations read under a shared lock; writers (seeding, test setup) take
/// the exclusive lock briefly.
pub struct InMemoryStore<E> {
    rows: RwLock<Vec<E>>,
}

impl<E: Entity> InMemoryStore<E> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store seeded with entities.
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let store = Self::new();
        store.put_all(entities);
        store
    }

    /// Inserts an entity, replacing any entity with the same id in place.
    pub fn put(&self, entity: E) {
        let mut rows = self.rows.write();
        let id = entity.id();
        match rows.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => *existing = entity,
            None => rows.push(entity),
        }
    }

    /// Inserts every entity.
    pub fn put_all(&self, entities: impl IntoIterator<Item = E>) {
        for entity in entities {
            self.put(entity);
        }
    }

    /// Removes the entity with the given id. Returns true if one was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|entity| entity.id() != id);
        rows.len() != before
    }

    /// Removes every entity.
    pub fn clear(&self) {
        self.rows.write().clear();
    }

    /// Returns the number of stored entities.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Returns a copy of every stored entity.
    pub fn snapshot(&self) -> Vec<E> {
        self.rows.read().clone()
    }

    /// Runs `f` over the stored entities under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&[E]) -> T) -> T {
        let rows = self.rows.read();
        f(&rows)
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for InMemoryStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("len", &self.rows.read().len())
            .finish()
    }
}

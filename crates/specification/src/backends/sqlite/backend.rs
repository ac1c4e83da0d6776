//! SQLite store.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::Entity;
use crate::error::{BackendError, StorageError, StorageResult};

use super::schema;

/// SQLite-backed entity store.
///
/// Entity documents are kept as JSON text in one `entities` table,
/// partitioned by [`Entity::COLLECTION`]. Relation fields are stored apart in
/// `entity_relations` and only read back when a Specification includes them.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteStoreConfig,
    is_memory: bool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Maximum number of connections in the pool. In-memory databases always
    /// use a single connection so every handle sees the same data.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
        }
    }
}

impl SqliteStore {
    /// Creates a new in-memory SQLite store.
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_config(":memory:", SqliteStoreConfig::default())
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_config(path, SqliteStoreConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteStoreConfig) -> StorageResult<Self> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let enable_wal = config.enable_wal && !is_memory;
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if enable_wal {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            Ok(())
        });

        let (max_size, min_idle) = if is_memory {
            (1, 1)
        } else {
            (
                config.max_connections.max(1),
                config.min_connections.min(config.max_connections.max(1)),
            )
        };

        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(min_idle))
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
            .build(manager)
            .map_err(|e| {
                StorageError::Backend(BackendError::ConnectionFailed {
                    backend_name: "sqlite".to_string(),
                    message: e.to_string(),
                })
            })?;

        Ok(Self {
            pool,
            config,
            is_memory,
        })
    }

    /// Initialize the database schema.
    pub fn init_schema(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)?;
        info!(
            version = schema::SCHEMA_VERSION,
            is_memory = self.is_memory,
            "SQLite schema initialized"
        );
        Ok(())
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(
        &self,
    ) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Inserts or replaces one entity.
    pub fn put<E: Entity>(&self, entity: &E) -> StorageResult<()> {
        self.put_all(std::slice::from_ref(entity))
    }

    /// Inserts or replaces entities in a single transaction.
    pub fn put_all<E: Entity>(&self, entities: &[E]) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        for entity in entities {
            let id = entity.id();
            let (data, relations) = split_document(entity)?;

            tx.execute(
                "INSERT INTO entities (collection, id, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data",
                params![E::COLLECTION, id, data],
            )?;
            tx.execute(
                "DELETE FROM entity_relations WHERE collection = ?1 AND entity_id = ?2",
                params![E::COLLECTION, id],
            )?;
            for (relation, payload) in relations {
                tx.execute(
                    "INSERT INTO entity_relations (collection, entity_id, relation, data)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![E::COLLECTION, id, relation, payload],
                )?;
            }
        }
        tx.commit()?;
        debug!(
            collection = E::COLLECTION,
            count = entities.len(),
            "Stored entities"
        );
        Ok(())
    }

    /// Removes the entity with the given id. Returns true if one was removed.
    pub fn remove<E: Entity>(&self, id: &str) -> StorageResult<bool> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM entity_relations WHERE collection = ?1 AND entity_id = ?2",
            params![E::COLLECTION, id],
        )?;
        let removed = tx.execute(
            "DELETE FROM entities WHERE collection = ?1 AND id = ?2",
            params![E::COLLECTION, id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Removes every entity of the collection.
    pub fn clear<E: Entity>(&self) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM entity_relations WHERE collection = ?1",
            params![E::COLLECTION],
        )?;
        tx.execute(
            "DELETE FROM entities WHERE collection = ?1",
            params![E::COLLECTION],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Returns the number of stored entities of the collection.
    pub fn len<E: Entity>(&self) -> StorageResult<u64> {
        let conn = self.get_connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE collection = ?1",
            params![E::COLLECTION],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Serializes an entity and splits off its relation fields.
///
/// Returns the entity document without relations plus one
/// `(relation, json)` pair per relation field present.
pub(crate) fn split_document<E: Entity>(entity: &E) -> StorageResult<(String, Vec<(String, String)>)> {
    let mut document = serde_json::to_value(entity)?;
    let mut relations = Vec::new();
    match &mut document {
        Value::Object(map) => {
            for relation in E::relations() {
                if let Some(payload) = map.remove(*relation) {
                    relations.push((relation.to_string(), serde_json::to_string(&payload)?));
                }
            }
        }
        other => {
            return Err(StorageError::Backend(BackendError::SerializationError {
                message: format!(
                    "{} entity '{}' serialized to {} instead of an object",
                    E::COLLECTION,
                    entity.id(),
                    json_kind(other)
                ),
            }));
        }
    }
    Ok((serde_json::to_string(&document)?, relations))
}

/// Rebuilds an entity from its stored document and included relations.
pub(crate) fn join_document<E: Entity>(
    data: &str,
    relations: Vec<(String, Option<String>)>,
) -> StorageResult<E> {
    let mut document: Value = serde_json::from_str(data)?;
    if let Value::Object(map) = &mut document {
        for (relation, payload) in relations {
            if let Some(payload) = payload {
                map.insert(relation, serde_json::from_str(&payload)?);
            }
        }
    }
    Ok(serde_json::from_value(document)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

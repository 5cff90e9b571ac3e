//! # Device Storage
//!
//! Key-value persistence used as the fallback source of truth when the
//! backend is unreachable.
//!
//! Values are JSON snapshots of the in-memory domain model. Two backends:
//!
//! 1. **`MemoryStorage`**: process-local map, cloneable handle (tests and
//!    ephemeral sessions).
//! 2. **`SqliteStorage`**: single `kv` table in SQLite (feature `persistence`).
//!
//! Reads and writes from the stores go through [`load_json`] and
//! [`save_json`], which are best-effort: failures are logged and swallowed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CommunityError, Result};

/// Ride list snapshot.
pub const RIDES_KEY: &str = "autoshare.rides";
/// Queue of locality suggestions awaiting backend sync.
pub const PENDING_SUGGESTIONS_KEY: &str = "localities.pending";
/// Locality list snapshot.
pub const LOCALITIES_KEY: &str = "localities.snapshot";

/// Injected key-value persistence capability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// In-memory storage
// ============================================================================

/// In-memory storage. Clones share the same underlying map, so two stores
/// built from clones see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CommunityError::storage("memory storage lock poisoned"))
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// SQLite storage
// ============================================================================

#[cfg(feature = "persistence")]
pub use sqlite::SqliteStorage;

#[cfg(feature = "persistence")]
mod sqlite {
    use rusqlite::{params, Connection, OptionalExtension};

    use super::KeyValueStore;
    use crate::error::Result;

    /// Durable storage backed by a SQLite `kv` table.
    pub struct SqliteStorage {
        db: Connection,
    }

    impl SqliteStorage {
        /// Open (or create) the database at `db_path`.
        pub fn open(db_path: &str) -> Result<Self> {
            let db = Connection::open(db_path)?;
            Self::init_schema(&db)?;
            Ok(Self { db })
        }

        /// Create an in-memory database (for testing).
        pub fn in_memory() -> Result<Self> {
            Self::open(":memory:")
        }

        fn init_schema(conn: &Connection) -> Result<()> {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
                );
            "#,
            )?;
            Ok(())
        }
    }

    impl KeyValueStore for SqliteStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let value = self
                .db
                .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.db.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )?;
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.db.execute("DELETE FROM kv WHERE key = ?", params![key])?;
            Ok(())
        }
    }
}

// ============================================================================
// Best-effort JSON helpers
// ============================================================================

/// Read and decode a snapshot. Missing keys, read errors and parse errors all
/// yield `None`.
pub fn load_json<T, S>(storage: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("[Storage] No cached value for {}", key);
            return None;
        }
        Err(e) => {
            warn!("[Storage] Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[Storage] Discarding unreadable {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a snapshot, logging failures.
pub fn save_json<T, S>(storage: &S, key: &str, value: &T)
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!("[Storage] Failed to encode {}: {}", key, e);
            return;
        }
    };
    if let Err(e) = storage.set(key, &encoded) {
        warn!("[Storage] Failed to write {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Storage whose every call fails.
    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CommunityError::storage("disk on fire"))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CommunityError::storage("disk on fire"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(CommunityError::storage("disk on fire"))
        }
    }

    #[test]
    fn test_memory_storage_shared_between_clones() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap(), Some("v".to_string()));
        b.remove("k").unwrap();
        assert_eq!(a.get("k").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::new();
        save_json(&storage, "nums", &vec![1, 2, 3]);
        let loaded: Option<Vec<i32>> = load_json(&storage, "nums");
        assert_eq!(loaded, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = load_json(&storage, "other");
        assert!(missing.is_none());
    }

    #[test]
    fn test_corrupt_value_treated_as_missing() {
        let storage = MemoryStorage::new();
        storage.set("nums", "{not json").unwrap();
        let loaded: Option<Vec<i32>> = load_json(&storage, "nums");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_broken_storage_is_swallowed() {
        save_json(&BrokenStorage, "nums", &vec![1]);
        let loaded: Option<Vec<i32>> = load_json(&BrokenStorage, "nums");
        assert!(loaded.is_none());
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_storage() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("two".to_string()));
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn test_sqlite_storage_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("community.db");
        let path = path.to_str().unwrap();

        {
            let storage = SqliteStorage::open(path).unwrap();
            storage.set(RIDES_KEY, "[]").unwrap();
        }

        let storage = SqliteStorage::open(path).unwrap();
        assert_eq!(storage.get(RIDES_KEY).unwrap(), Some("[]".to_string()));
    }
}

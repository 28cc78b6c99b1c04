use std::fs;
use std::path::Path;

use rusqlite::{named_params, Connection, OptionalExtension};

use crate::storage::{Storage, StorageError};

/// Durable key-value medium backed by a single SQLite file.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let storage = Self { conn };
        storage.apply_migrations()?;
        Ok(storage)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let storage = Self {
            conn: Connection::open_in_memory()?,
        };
        storage.apply_migrations()?;
        Ok(storage)
    }

    fn apply_migrations(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
             );",
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = :key",
                named_params! { ":key": key },
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (:key, :value)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            named_params! { ":key": key, ":value": value },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("seek.sqlite3");

        {
            let storage = SqliteStorage::open(&path).unwrap();
            assert_eq!(storage.read("user_config").unwrap(), None);
            storage.write("user_config", br#"{"result_limit":5}"#).unwrap();
            storage.write("user_config", br#"{"result_limit":9}"#).unwrap();
        }

        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(
            reopened.read("user_config").unwrap(),
            Some(br#"{"result_limit":9}"#.to_vec())
        );
    }

    #[test]
    fn in_memory_keys_are_independent() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.write("a", b"1").unwrap();
        storage.write("b", b"2").unwrap();
        assert_eq!(storage.read("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(storage.read("b").unwrap(), Some(b"2".to_vec()));
    }
}

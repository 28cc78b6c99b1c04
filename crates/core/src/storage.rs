//! Key-value persistence media used to keep settings across restarts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistent storage is unavailable")]
    Unavailable,
    #[error("sqlite storage failure: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// A synchronous, local, single-writer key-value medium.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// In-process medium. Clones share the same entries, so a clone handed to a
/// second loader sees everything written through the first.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.into());
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Medium that is switched off: nothing is ever stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStorage;

impl Storage for DisabledStorage {
    fn read(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

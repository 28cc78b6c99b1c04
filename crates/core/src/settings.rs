//! User preferences that persist across restarts and heal stale shapes on load.
//!
//! The whole record lives under one key of a [`Storage`] medium as JSON. On
//! load, any field of the default record missing from the stored payload is
//! filled in from the default, while fields the current schema does not know
//! are carried along untouched. There is no schema version: renaming a field
//! leaves the old value orphaned under its old name.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::observable::{Observable, Subscription};
use crate::storage::{Storage, StorageError};

pub const SETTINGS_KEY: &str = "user_config";
pub const DEFAULT_RESULT_LIMIT: i64 = 21;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Maximum number of results to show
    pub result_limit: i64,

    /// Fields written by other versions of the application.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("failed to read stored settings: {0}")]
    Read(#[from] StorageError),
    #[error("stored settings are not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("stored settings are not a JSON object")]
    NotARecord,
    #[error("stored settings do not match the schema: {0}")]
    Shape(#[source] serde_json::Error),
}

/// An observable settings record mirrored to a persistence medium.
///
/// Every mutation is written back synchronously before the mutating call
/// returns. Write failures are logged and otherwise ignored: the in-memory
/// value stays authoritative for the rest of the session.
pub struct PersistedSettings<T> {
    key: String,
    default: T,
    value: Observable<T>,
    _writeback: Subscription,
}

impl<T> PersistedSettings<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    /// Load the record stored under `key`, falling back to `default` when it
    /// is absent, empty or unreadable, and start mirroring changes to
    /// `storage`.
    ///
    /// A successfully loaded record is written back once immediately, so a
    /// backfilled shape replaces the stale one in the medium. An unreadable
    /// payload is left in place until the first mutation.
    pub fn load(storage: impl Storage + 'static, key: &str, default: T) -> Self {
        let storage: Rc<dyn Storage> = Rc::new(storage);
        let (initial, fell_back) = match read_record(storage.as_ref(), key, &default) {
            Ok(record) => (record, false),
            Err(err) => {
                tracing::warn!(key, error = %err, "falling back to default settings");
                (default.clone(), true)
            }
        };

        let value = Observable::new(initial);
        let writeback = {
            let storage = Rc::clone(&storage);
            let key = key.to_string();
            let skip_initial = Cell::new(fell_back);
            value.subscribe(move |current: &T| {
                if skip_initial.replace(false) {
                    return;
                }
                write_record(storage.as_ref(), &key, current)
            })
        };

        Self {
            key: key.to_string(),
            default,
            value,
            _writeback: writeback,
        }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    pub fn set(&self, value: T) {
        self.value.set(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.value.update(f);
    }

    pub fn replace_with(&self, f: impl FnOnce(T) -> T) {
        self.value.replace_with(f);
    }

    /// Restore the default record and persist it.
    pub fn reset(&self) {
        self.value.set(self.default.clone());
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.value.subscribe(callback)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistedSettings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSettings")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

fn read_record<T>(storage: &dyn Storage, key: &str, default: &T) -> Result<T, LoadError>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let raw = match storage.read(key)? {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(default.clone()),
    };

    let parsed: Value = serde_json::from_slice(&raw).map_err(LoadError::Parse)?;
    let Value::Object(mut record) = parsed else {
        return Err(LoadError::NotARecord);
    };
    if let Value::Object(defaults) = serde_json::to_value(default).map_err(LoadError::Shape)? {
        backfill(&mut record, defaults);
    }
    serde_json::from_value(Value::Object(record)).map_err(LoadError::Shape)
}

fn backfill(record: &mut Map<String, Value>, defaults: Map<String, Value>) {
    for (field, value) in defaults {
        record.entry(field).or_insert(value);
    }
}

fn write_record<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to serialize settings");
            return;
        }
    };
    match storage.write(key, &bytes) {
        Ok(()) => {}
        Err(StorageError::Unavailable) => {
            tracing::trace!(key, "storage unavailable; settings kept in memory")
        }
        Err(err) => tracing::warn!(key, error = %err, "failed to persist settings"),
    }
}

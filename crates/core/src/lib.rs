pub mod config;
pub mod context;
pub mod observable;
pub mod panels;
pub mod registry;
pub mod settings;
pub mod sqlite;
pub mod storage;

pub use config::AppConfig;
pub use context::AppContext;
pub use observable::{Observable, Subscription};
pub use panels::{Panel, PanelKind, PanelRegistry};
pub use registry::{CapabilityRegistry, Catalog, RegistryError, Resolved};
pub use settings::{PersistedSettings, UserSettings, SETTINGS_KEY};
pub use sqlite::SqliteStorage;
pub use storage::{DisabledStorage, MemoryStorage, Storage, StorageError};

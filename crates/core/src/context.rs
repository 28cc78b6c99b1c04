//! Application-wide state, constructed once at startup and handed to consumers.

use anyhow::Result;

use crate::config::AppConfig;
use crate::panels::{self, PanelRegistry};
use crate::settings::{PersistedSettings, UserSettings, SETTINGS_KEY};
use crate::sqlite::SqliteStorage;
use crate::storage::{DisabledStorage, Storage};

#[derive(Debug)]
pub struct AppContext {
    panels: PanelRegistry,
    settings: PersistedSettings<UserSettings>,
}

impl AppContext {
    /// Open the configured settings file and load the user settings from it. If the medium cannot be opened the session
    /// runs on defaults that are not persisted.
    pub fn bootstrap(config: &AppConfig) -> Result<Self> {
        let context = match SqliteStorage::open(config.settings_path()) {
            Ok(storage) => Self::with_storage(storage),
            Err(err) => {
                tracing::warn!(
                    path = %config.settings_path().display(),
                    error = %err,
                    "settings storage unavailable; changes will not persist"
                );
                Self::with_storage(DisabledStorage)
            }
        };
        Ok(context)
    }

    pub fn with_storage(storage: impl Storage + 'static) -> Self {
        Self {
            panels: PanelRegistry::new(panels::catalog()),
            settings: PersistedSettings::load(storage, SETTINGS_KEY, UserSettings::default()),
        }
    }

    pub fn panels(&self) -> &PanelRegistry {
        &self.panels
    }

    pub fn settings(&self) -> &PersistedSettings<UserSettings> {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::PanelKind;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn settings_survive_a_restart() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::in_dir(temp_dir.path());

        {
            let context = AppContext::bootstrap(&config).unwrap();
            assert_eq!(context.settings().get().result_limit, 21);
            context.settings().update(|s| s.result_limit = 50);
        }

        let restarted = AppContext::bootstrap(&config).unwrap();
        assert_eq!(restarted.settings().get().result_limit, 50);
    }

    #[test]
    fn layout_observes_panel_membership() {
        let context = AppContext::with_storage(MemoryStorage::new());
        let mounted = Rc::new(RefCell::new(Vec::new()));
        let _layout = {
            let mounted = Rc::clone(&mounted);
            context.panels().subscribe(move |entries| {
                *mounted.borrow_mut() = entries.keys().cloned().collect::<Vec<_>>();
            })
        };

        context.panels().add("ParseError").unwrap();
        context.panels().add_kind(PanelKind::SearchResult);
        assert_eq!(*mounted.borrow(), vec!["ParseError", "SearchResult"]);

        context.panels().remove("ParseError");
        assert_eq!(*mounted.borrow(), vec!["SearchResult"]);
        assert!(context.panels().add("Preview").is_err());
    }

    #[test]
    fn unopenable_medium_degrades_to_memory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let config = AppConfig::in_dir(blocker);

        let context = AppContext::bootstrap(&config).unwrap();
        context.settings().update(|s| s.result_limit = 8);
        assert_eq!(context.settings().get().result_limit, 8);
    }
}

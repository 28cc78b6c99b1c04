//! Locates the settings database for a session.
//!
//! Nothing is created here: `SqliteStorage::open` makes the parent directory
//! on first use, so a read-only lookup never touches the filesystem.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::{BaseDirs, ProjectDirs};

pub const SETTINGS_FILE_NAME: &str = "seek.sqlite3";
const ENV_SETTINGS_PATH: &str = "SEEK_SETTINGS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    settings_path: PathBuf,
}

impl AppConfig {
    /// Pick the settings file: an explicit path first, then `SEEK_SETTINGS`,
    /// then the platform config directory, then `~/.seek`.
    pub fn discover(settings_override: Option<PathBuf>) -> Result<Self> {
        let settings_path = match settings_override {
            Some(path) => path,
            None => match env::var_os(ENV_SETTINGS_PATH) {
                Some(path) if !path.is_empty() => PathBuf::from(path),
                _ => platform_settings_path()?,
            },
        };
        Ok(Self { settings_path })
    }

    /// Keep the settings file inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            settings_path: dir.as_ref().join(SETTINGS_FILE_NAME),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }
}

fn platform_settings_path() -> Result<PathBuf> {
    if let Some(project) = ProjectDirs::from("dev", "seek", "seek") {
        return Ok(project.config_dir().join(SETTINGS_FILE_NAME));
    }
    BaseDirs::new()
        .map(|base| base.home_dir().join(".seek").join(SETTINGS_FILE_NAME))
        .ok_or_else(|| anyhow!("no home directory found to keep settings in"))
}

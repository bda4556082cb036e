//! Loading and saving the preferences file
//!
//! Preferences live in `~/Library/Application Support/hudctl/data.json`,
//! written atomically (temp file + rename) to prevent corruption. The
//! `HUDCTL_DATA_DIR` environment variable overrides the directory, which
//! also keeps tests hermetic.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::models::AppData;
use crate::error::Result;

/// Directory override environment variable.
const DATA_DIR_ENV: &str = "HUDCTL_DATA_DIR";

/// Loads and saves the preferences file.
pub struct ConfigManager {
    data_dir: PathBuf,
}

impl ConfigManager {
    /// Manager rooted at the default (or overridden) data directory.
    pub fn new() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }

    /// Manager rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
        }
    }

    /// Resolve the data directory.
    ///
    /// `HUDCTL_DATA_DIR` wins; otherwise the per-user Application Support
    /// directory, falling back to the current directory when `HOME` is
    /// unset.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("hudctl"),
            Err(_) => PathBuf::from("."),
        }
    }

    /// Directory holding the data file and logs.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Path to the preferences file.
    pub fn data_path(&self) -> PathBuf {
        self.data_dir.join("data.json")
    }

    /// Load preferences from disk.
    ///
    /// A missing file is normal and yields defaults; a corrupt file is
    /// logged and replaced by defaults rather than failing the command.
    pub fn load(&self) -> Result<AppData> {
        let path = self.data_path();

        if !path.exists() {
            info!("Preferences file not found, using defaults");
            return Ok(AppData::default());
        }

        let json = std::fs::read_to_string(&path)?;

        match serde_json::from_str(&json) {
            Ok(data) => {
                info!("Preferences loaded from {}", path.display());
                Ok(data)
            }
            Err(e) => {
                warn!("Failed to parse preferences, using defaults: {}", e);
                Ok(AppData::default())
            }
        }
    }

    /// Save preferences to disk with an atomic write.
    ///
    /// Writes to a temporary file in the same directory, then renames over
    /// the target.
    pub fn save(&self, data: &AppData) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let path = self.data_path();
        let temp_path = self.data_dir.join("data.json.tmp");
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&temp_path, json)?;
        std::fs::rename(temp_path, path)?;

        info!("Preferences saved");
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::SavedCombo;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path());
        let data = manager.load().unwrap();
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path());

        let mut data = AppData::default();
        data.saved_combos.insert(
            "combo".to_string(),
            SavedCombo {
                udid: "UDID".to_string(),
                bundle_path: "/private/var/containers/Bundle/Application/X/Game.app".to_string(),
            },
        );
        data.record_history("xcrun devicectl device process launch ...");
        manager.save(&data).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path());
        std::fs::write(manager.data_path(), "{not json").unwrap();
        let data = manager.load().unwrap();
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path());
        manager.save(&AppData::default()).unwrap();
        assert!(manager.data_path().exists());
        assert!(!dir.path().join("data.json.tmp").exists());
    }
}

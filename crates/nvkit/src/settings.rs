use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nvkit_platform::AppPaths;

const DEFAULT_LOG_CAP_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Overrides `$NVM_DIR` detection on POSIX systems.
    #[serde(default)]
    pub nvm_dir: Option<PathBuf>,

    /// Overrides `nvm.exe` detection on Windows.
    #[serde(default)]
    pub nvm_exe: Option<PathBuf>,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_log_cap")]
    pub max_log_size_bytes: u64,

    #[serde(default = "default_check_updates")]
    pub check_tool_updates: bool,
}

fn default_check_updates() -> bool {
    true
}

fn default_log_cap() -> u64 {
    DEFAULT_LOG_CAP_BYTES
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            nvm_dir: None,
            nvm_exe: None,
            debug_logging: false,
            max_log_size_bytes: default_log_cap(),
            check_tool_updates: default_check_updates(),
        }
    }
}

impl AppSettings {
    fn load_from_path(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn save_to_path(&self, path: &Path) -> Result<(), std::io::Error> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)
    }

    /// Settings from the platform config directory. Missing or unreadable
    /// files fall back to defaults rather than failing startup.
    #[must_use]
    pub fn load() -> Self {
        AppPaths::new()
            .map(|paths| Self::load_from_path(&paths.settings_file()))
            .unwrap_or_default()
    }

    /// Persists the settings as pretty JSON in the platform config directory.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let paths = AppPaths::new().map_err(std::io::Error::other)?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.settings_file())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppSettings, DEFAULT_LOG_CAP_BYTES};

    #[test]
    fn defaults_enable_update_checks_but_not_debug_logging() {
        let settings = AppSettings::default();

        assert!(settings.check_tool_updates);
        assert!(!settings.debug_logging);
        assert_eq!(settings.max_log_size_bytes, DEFAULT_LOG_CAP_BYTES);
        assert!(settings.nvm_dir.is_none());
        assert!(settings.nvm_exe.is_none());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");

        let settings = AppSettings::load_from_path(&dir.path().join("settings.json"));

        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("seed settings");

        assert_eq!(AppSettings::load_from_path(&path), AppSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "debug_logging": true }"#).expect("seed settings");

        let settings = AppSettings::load_from_path(&path);

        assert!(settings.debug_logging);
        assert!(settings.check_tool_updates);
        assert_eq!(settings.max_log_size_bytes, DEFAULT_LOG_CAP_BYTES);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");

        let settings = AppSettings {
            nvm_dir: Some("/srv/node-managers/nvm".into()),
            check_tool_updates: false,
            ..AppSettings::default()
        };
        settings.save_to_path(&path).expect("save settings");

        assert_eq!(AppSettings::load_from_path(&path), settings);
    }
}

use std::path::PathBuf;
use thiserror::Error;

const APP_DIR_NAME: &str = "nvkit";
const SETTINGS_FILE_NAME: &str = "settings.json";
const LOG_FILE_NAME: &str = "debug.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("no per-user config directory on this platform")]
    ConfigDirUnavailable,
    #[error("no per-user data directory on this platform")]
    DataDirUnavailable,
}

/// Where the settings file and the log live. Linux puts these under the XDG
/// config and data directories, macOS maps both to
/// `~/Library/Application Support`, Windows to the roaming profile.
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

fn app_dir(base: Option<PathBuf>, missing: AppPathsError) -> Result<PathBuf, AppPathsError> {
    base.map(|dir| dir.join(APP_DIR_NAME)).ok_or(missing)
}

impl AppPaths {
    /// Resolves the per-user application directories.
    ///
    /// # Errors
    /// Returns an error when the platform reports no config or data
    /// directory for the current user.
    pub fn new() -> Result<Self, AppPathsError> {
        Ok(Self {
            config_dir: app_dir(dirs::config_dir(), AppPathsError::ConfigDirUnavailable)?,
            data_dir: app_dir(dirs::data_dir(), AppPathsError::DataDirUnavailable)?,
        })
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE_NAME)
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Creates the directories if they are missing.
    ///
    /// # Errors
    /// Returns an error if a directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

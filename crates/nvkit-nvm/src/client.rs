use std::sync::Arc;

use log::{debug, error, info};

use nvkit_backend::{BackendError, CommandRunner, VersionIdentifier, VersionManagerState};

use crate::detection::NvmInstallation;
use crate::platform::{NvmAction, PlatformCommands, PosixNvm, WindowsNvm};
use crate::runner::ProcessRunner;
use crate::version::clean_output;

/// Orchestrates one `nvm` installation: builds commands through the platform
/// strategy, runs them through the command runner, and keeps the last-fetched
/// version lists for validating mutating calls.
pub struct NvmClient {
    platform: Box<dyn PlatformCommands>,
    runner: Arc<dyn CommandRunner>,
    state: VersionManagerState,
}

impl NvmClient {
    #[must_use]
    pub fn new(platform: Box<dyn PlatformCommands>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            platform,
            runner,
            state: VersionManagerState::default(),
        }
    }

    /// Client for a detected installation, running real subprocesses.
    #[must_use]
    pub fn for_installation(installation: &NvmInstallation) -> Self {
        let platform: Box<dyn PlatformCommands> = match installation {
            NvmInstallation::Posix { nvm_dir } => Box::new(PosixNvm::new(nvm_dir.clone())),
            NvmInstallation::Windows { nvm_exe } => Box::new(WindowsNvm::new(nvm_exe.clone())),
        };
        Self::new(platform, Arc::new(ProcessRunner))
    }

    #[must_use]
    pub fn state(&self) -> &VersionManagerState {
        &self.state
    }

    async fn execute(&self, action: &NvmAction) -> Result<String, BackendError> {
        let invocation = self.platform.invocation(action);
        let output = self.runner.run(&invocation).await?;

        if output.success {
            Ok(clean_output(&output.stdout))
        } else {
            Err(BackendError::command_failed(output.stderr))
        }
    }

    /// Whether the tool answers at all. Spawn failures and non-zero exits
    /// (for example an unsourceable `nvm.sh`) both count as not installed.
    pub async fn detect_installed(&self) -> bool {
        match self.execute(&NvmAction::Probe).await {
            Ok(_) => true,
            Err(error) => {
                debug!("nvm probe failed: {error}");
                false
            }
        }
    }

    /// The active version, or `None` when the tool reports no managed
    /// version (empty output, `none`, or the system Node).
    ///
    /// # Errors
    /// Returns an error if the current-version query fails.
    pub async fn fetch_current(&mut self) -> Result<Option<VersionIdentifier>, BackendError> {
        let output = self.execute(&NvmAction::Current).await?;
        let current = self.platform.parse_current(&output);

        debug!("nvm current: {current:?}");
        self.state.record_current(current.clone());

        Ok(current)
    }

    /// Installed versions in listing order, with the system entry and the
    /// alias footer excluded. Updates the cached installed list.
    ///
    /// # Errors
    /// Returns an error if the installed listing fails.
    pub async fn fetch_installed(&mut self) -> Result<Vec<VersionIdentifier>, BackendError> {
        let output = self.execute(&NvmAction::ListInstalled).await?;
        let versions = self.platform.parse_installed(&output);

        debug!("nvm reported {} installed versions", versions.len());
        self.state.record_installed(versions.clone());

        Ok(versions)
    }

    /// Versions available for installation, minus anything in the cached
    /// installed list. Updates the cached available list.
    ///
    /// # Errors
    /// Returns an error if the remote listing fails.
    pub async fn fetch_available(&mut self) -> Result<Vec<VersionIdentifier>, BackendError> {
        let output = self.execute(&NvmAction::ListAvailable).await?;
        let versions = self.platform.parse_available(&output);

        debug!("nvm reported {} available versions", versions.len());
        self.state.record_available(versions);

        Ok(self.state.available().to_vec())
    }

    /// Installs a version. Fails closed: a version not present in the
    /// last-fetched available list is rejected without running anything.
    pub async fn install(&mut self, version: &VersionIdentifier) -> bool {
        if !self.state.is_available(version) {
            info!("Install of {version} rejected: not in the available list");
            return false;
        }

        info!("Installing {version}");
        self.run_mutation(NvmAction::Install(version.clone()), "install")
            .await
    }

    /// Makes a version the default. Only versions in the last-fetched
    /// installed list are accepted.
    pub async fn switch_to(&mut self, version: &VersionIdentifier) -> bool {
        if !self.state.is_installed(version) {
            info!("Switch to {version} rejected: not in the installed list");
            return false;
        }

        info!("Switching default version to {version}");
        self.run_mutation(NvmAction::SetDefault(version.clone()), "switch")
            .await
    }

    /// Uninstalls a version from the last-fetched installed list. Process
    /// failures are reported as false, never propagated.
    pub async fn uninstall(&mut self, version: &VersionIdentifier) -> bool {
        if !self.state.is_installed(version) {
            info!("Uninstall of {version} rejected: not in the installed list");
            return false;
        }

        info!("Uninstalling {version}");
        self.run_mutation(NvmAction::Uninstall(version.clone()), "uninstall")
            .await
    }

    async fn run_mutation(&mut self, action: NvmAction, verb: &str) -> bool {
        match self.execute(&action).await {
            Ok(_) => {
                // The lists on disk changed under the cache.
                self.state.invalidate();
                true
            }
            Err(err) => {
                error!("nvm {verb} failed: {err}");
                false
            }
        }
    }

    /// Version of the tool itself.
    ///
    /// # Errors
    /// Returns an error if the version query fails.
    pub async fn tool_version(&self) -> Result<String, BackendError> {
        let output = self.execute(&NvmAction::ToolVersion).await?;
        Ok(output.trim().to_string())
    }
}

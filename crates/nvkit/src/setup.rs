use log::{debug, info};

use nvkit_backend::BackendError;
use nvkit_nvm::{
    NvmClient, NvmInstallation, ToolUpdate, check_for_tool_update, detect_installation,
};

use crate::dispatcher::CommandDispatcher;
use crate::settings::AppSettings;

/// Everything a host needs after startup: a dispatcher wired to the detected
/// installation, plus what detection learned about the tool itself.
pub struct Setup {
    pub dispatcher: CommandDispatcher,
    pub installation: NvmInstallation,
    pub tool_found: bool,
    pub tool_version: Option<String>,
    pub install_url: &'static str,
    http_client: reqwest::Client,
}

/// Detects the tool, probes it, and builds the dispatcher. A missing
/// installation still yields a usable `Setup` with `tool_found` false so the
/// host can point the user at `install_url`.
pub async fn initialize(settings: &AppSettings) -> Setup {
    info!("Initializing nvm orchestration");

    let installation = detect_installation(settings.nvm_dir.clone(), settings.nvm_exe.clone())
        .unwrap_or_else(|| {
            debug!("No nvm installation detected, using platform default paths");
            NvmInstallation::fallback()
        });

    let client = NvmClient::for_installation(&installation);
    let dispatcher = CommandDispatcher::new(client);

    let tool_found = dispatcher.detect_installed().await;
    let tool_version = if tool_found {
        match dispatcher.tool_version().await {
            Ok(version) => Some(version),
            Err(error) => {
                debug!("nvm version query failed: {error}");
                None
            }
        }
    } else {
        None
    };

    info!("nvm detection: found={tool_found}, version={tool_version:?}");

    let http_client = reqwest::Client::builder()
        .user_agent(format!("nvkit/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default();

    Setup {
        install_url: installation.repo_url(),
        dispatcher,
        installation,
        tool_found,
        tool_version,
        http_client,
    }
}

impl Setup {
    /// Asks GitHub whether a newer release of the tool exists.
    ///
    /// Skipped with `Ok(None)` when update checks are disabled in settings,
    /// when no tool was found, or when its version could not be read.
    ///
    /// # Errors
    /// Returns an error if the release lookup fails.
    pub async fn check_tool_update(
        &self,
        settings: &AppSettings,
    ) -> Result<Option<ToolUpdate>, BackendError> {
        if !settings.check_tool_updates || !self.tool_found {
            return Ok(None);
        }
        let Some(current_version) = self.tool_version.as_deref() else {
            return Ok(None);
        };

        check_for_tool_update(&self.http_client, current_version, &self.installation).await
    }
}

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use log::info;

use nvkit_backend::{BackendError, VersionIdentifier, VersionItem, VersionManagerState};
use nvkit_nvm::NvmClient;

use crate::events::{RefreshEvent, RefreshHub};

/// What a mutating action did, surfaced as a value instead of the
/// success/failure continuations the original host API threaded through.
/// `Rejected` covers both validation misses and tool failures; the message
/// is ready to show to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied { message: String },
    Rejected { message: String },
}

impl ActionOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Applied { message } | Self::Rejected { message } => message,
        }
    }
}

/// Entry point for hosts: wraps the client with refresh bookkeeping, event
/// fan-out, and user-facing outcome messages. One dispatcher per detected
/// installation; operations take `&mut self` and run one at a time.
pub struct CommandDispatcher {
    client: NvmClient,
    events: RefreshHub,
    last_refreshed: Option<DateTime<Utc>>,
}

impl CommandDispatcher {
    #[must_use]
    pub fn new(client: NvmClient) -> Self {
        Self {
            client,
            events: RefreshHub::default(),
            last_refreshed: None,
        }
    }

    /// Receiver of refresh events. Any number of views can subscribe.
    pub fn subscribe(&mut self) -> Receiver<RefreshEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> &VersionManagerState {
        self.client.state()
    }

    #[must_use]
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    /// Whether the underlying tool responds at all.
    pub async fn detect_installed(&self) -> bool {
        self.client.detect_installed().await
    }

    /// Version of the underlying tool.
    ///
    /// # Errors
    /// Returns an error if the version query fails.
    pub async fn tool_version(&self) -> Result<String, BackendError> {
        self.client.tool_version().await
    }

    /// Re-fetches every cached list. Installed is fetched before available
    /// so the duplicate filter works against fresh data, and current comes
    /// last so it can be checked against the new installed list.
    ///
    /// # Errors
    /// Returns the first fetch error; the cache keeps whatever was fetched
    /// before the failure.
    pub async fn refresh_all(&mut self) -> Result<(), BackendError> {
        info!("Refreshing all version lists");

        self.client.fetch_installed().await?;
        self.client.fetch_available().await?;
        self.client.fetch_current().await?;

        self.last_refreshed = Some(Utc::now());
        self.events.emit(&RefreshEvent::Refreshed);

        Ok(())
    }

    pub async fn install(&mut self, version: &VersionIdentifier) -> ActionOutcome {
        if self.client.install(version).await {
            self.events.emit(&RefreshEvent::Installed(version.clone()));
            ActionOutcome::Applied {
                message: format!("Installed {version} to your local nvm"),
            }
        } else {
            ActionOutcome::Rejected {
                message: format!("{version} is not a version that can be installed"),
            }
        }
    }

    pub async fn switch_to(&mut self, version: &VersionIdentifier) -> ActionOutcome {
        if self.client.switch_to(version).await {
            self.events.emit(&RefreshEvent::SwitchedTo(version.clone()));
            ActionOutcome::Applied {
                message: format!("Switched node version to {version}"),
            }
        } else {
            ActionOutcome::Rejected {
                message: format!("{version} is not an installed version"),
            }
        }
    }

    pub async fn uninstall(&mut self, version: &VersionIdentifier) -> ActionOutcome {
        if self.client.uninstall(version).await {
            self.events.emit(&RefreshEvent::Removed(version.clone()));
            ActionOutcome::Applied {
                message: format!("Deleted node version {version}"),
            }
        } else {
            ActionOutcome::Rejected {
                message: format!("Error deleting version {version}"),
            }
        }
    }

    /// Rows for an installed-versions view, with the active version flagged.
    #[must_use]
    pub fn installed_items(&self) -> Vec<VersionItem> {
        let state = self.client.state();
        state
            .installed()
            .iter()
            .map(|version| VersionItem {
                label: version.to_string(),
                is_active: state.current() == Some(version),
            })
            .collect()
    }

    /// Rows for an available-versions view. Nothing here is installed, so
    /// nothing is active.
    #[must_use]
    pub fn available_items(&self) -> Vec<VersionItem> {
        self.client
            .state()
            .available()
            .iter()
            .map(|version| VersionItem {
                label: version.to_string(),
                is_active: false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use nvkit_backend::{CommandRunner, ToolInvocation, ToolOutput};
    use nvkit_nvm::PosixNvm;

    use super::*;

    struct ScriptedRunner {
        responses: Mutex<VecDeque<ToolOutput>>,
        calls: Mutex<Vec<ToolInvocation>>,
    }

    impl ScriptedRunner {
        fn new(responses: Vec<ToolOutput>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn tool_args(&self) -> Vec<Vec<String>> {
            self.calls
                .lock()
                .expect("test lock poisoned")
                .iter()
                .map(|invocation| invocation.args[3..].to_vec())
                .collect()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutput> {
            self.calls
                .lock()
                .expect("test lock poisoned")
                .push(invocation.clone());
            Ok(self
                .responses
                .lock()
                .expect("test lock poisoned")
                .pop_front()
                .expect("test script ran out of responses"))
        }
    }

    fn dispatcher_with(responses: Vec<ToolOutput>) -> (CommandDispatcher, Arc<ScriptedRunner>) {
        let runner = ScriptedRunner::new(responses);
        let client = NvmClient::new(
            Box::new(PosixNvm::new(PathBuf::from("/home/user/.nvm"))),
            runner.clone(),
        );
        (CommandDispatcher::new(client), runner)
    }

    fn refresh_script() -> Vec<ToolOutput> {
        vec![
            ToolOutput::succeeded("v18.17.0\nv16.20.0\nsystem\n"),
            ToolOutput::succeeded("v20.11.0\nv18.17.0\n"),
            ToolOutput::succeeded("v18.17.0\n"),
        ]
    }

    #[tokio::test]
    async fn refresh_all_fetches_installed_before_available() {
        let (mut dispatcher, runner) = dispatcher_with(refresh_script());

        dispatcher.refresh_all().await.expect("refresh succeeds");

        assert_eq!(
            runner.tool_args(),
            vec![
                vec!["ls".to_string()],
                vec!["ls-remote".to_string()],
                vec!["current".to_string()],
            ]
        );
        assert!(dispatcher.last_refreshed().is_some());
    }

    #[tokio::test]
    async fn refresh_all_emits_a_refreshed_event() {
        let (mut dispatcher, _runner) = dispatcher_with(refresh_script());
        let events = dispatcher.subscribe();

        dispatcher.refresh_all().await.expect("refresh succeeds");

        assert_eq!(events.try_recv(), Ok(RefreshEvent::Refreshed));
    }

    #[tokio::test]
    async fn installed_items_flag_the_active_version() {
        let (mut dispatcher, _runner) = dispatcher_with(refresh_script());

        dispatcher.refresh_all().await.expect("refresh succeeds");
        let items = dispatcher.installed_items();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "v18.17.0");
        assert!(items[0].is_active);
        assert_eq!(items[1].label, "v16.20.0");
        assert!(!items[1].is_active);
    }

    #[tokio::test]
    async fn available_items_exclude_installed_versions() {
        let (mut dispatcher, _runner) = dispatcher_with(refresh_script());

        dispatcher.refresh_all().await.expect("refresh succeeds");
        let items = dispatcher.available_items();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "v20.11.0");
        assert!(!items[0].is_active);
    }

    #[tokio::test]
    async fn install_of_listed_version_applies_and_notifies() {
        let mut script = refresh_script();
        script.push(ToolOutput::succeeded("Now using node v20.11.0\n"));
        let (mut dispatcher, _runner) = dispatcher_with(script);
        let events = dispatcher.subscribe();

        dispatcher.refresh_all().await.expect("refresh succeeds");
        let outcome = dispatcher.install(&VersionIdentifier::new("v20.11.0")).await;

        assert!(outcome.is_applied());
        assert_eq!(outcome.message(), "Installed v20.11.0 to your local nvm");
        assert_eq!(events.try_recv(), Ok(RefreshEvent::Refreshed));
        assert_eq!(
            events.try_recv(),
            Ok(RefreshEvent::Installed(VersionIdentifier::new("v20.11.0")))
        );
    }

    #[tokio::test]
    async fn install_of_unlisted_version_is_rejected_without_event() {
        let (mut dispatcher, runner) = dispatcher_with(vec![]);
        let events = dispatcher.subscribe();

        let outcome = dispatcher.install(&VersionIdentifier::new("v99.0.0")).await;

        assert!(!outcome.is_applied());
        assert!(outcome.message().contains("v99.0.0"));
        assert!(events.try_recv().is_err());
        assert!(runner.tool_args().is_empty());
    }

    #[tokio::test]
    async fn switch_to_emits_switched_event() {
        let mut script = refresh_script();
        script.push(ToolOutput::succeeded("default -> v16.20.0\n"));
        let (mut dispatcher, _runner) = dispatcher_with(script);

        dispatcher.refresh_all().await.expect("refresh succeeds");
        let events = dispatcher.subscribe();
        let outcome = dispatcher
            .switch_to(&VersionIdentifier::new("v16.20.0"))
            .await;

        assert!(outcome.is_applied());
        assert_eq!(outcome.message(), "Switched node version to v16.20.0");
        assert_eq!(
            events.try_recv(),
            Ok(RefreshEvent::SwitchedTo(VersionIdentifier::new("v16.20.0")))
        );
    }

    #[tokio::test]
    async fn failed_uninstall_reports_error_message() {
        let mut script = refresh_script();
        script.push(ToolOutput::failed("nvm: version is in use"));
        let (mut dispatcher, _runner) = dispatcher_with(script);

        dispatcher.refresh_all().await.expect("refresh succeeds");
        let events = dispatcher.subscribe();
        let outcome = dispatcher
            .uninstall(&VersionIdentifier::new("v18.17.0"))
            .await;

        assert!(!outcome.is_applied());
        assert_eq!(outcome.message(), "Error deleting version v18.17.0");
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn refresh_failure_propagates_and_skips_the_event() {
        let (mut dispatcher, _runner) =
            dispatcher_with(vec![ToolOutput::failed("nvm: command not found")]);
        let events = dispatcher.subscribe();

        let result = dispatcher.refresh_all().await;

        assert!(result.is_err());
        assert!(dispatcher.last_refreshed().is_none());
        assert!(events.try_recv().is_err());
    }
}

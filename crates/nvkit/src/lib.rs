mod dispatcher;
mod events;
mod settings;
mod setup;

pub mod logging;

pub use dispatcher::{ActionOutcome, CommandDispatcher};
pub use events::RefreshEvent;
pub use settings::AppSettings;
pub use setup::{Setup, initialize};

pub use nvkit_nvm::{
    BackendError, CommandRunner, NvmAction, NvmClient, NvmInstallation, PlatformCommands,
    PosixNvm, ProcessRunner, ToolInvocation, ToolOutput, ToolUpdate, VersionIdentifier,
    VersionItem, VersionManagerState, WindowsNvm, check_for_tool_update, detect_installation,
};

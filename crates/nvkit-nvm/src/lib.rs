mod client;
mod detection;
mod platform;
mod runner;
mod update;
mod version;

pub use client::NvmClient;
pub use detection::{
    NVM_POSIX_REPO_URL, NVM_WINDOWS_REPO_URL, NvmInstallation, detect_installation,
};
pub use platform::{NvmAction, PlatformCommands, PosixNvm, WindowsNvm};
pub use runner::ProcessRunner;
pub use update::{ToolUpdate, check_for_tool_update};

pub use nvkit_backend::{
    BackendError, CommandRunner, ToolInvocation, ToolOutput, VersionIdentifier, VersionItem,
    VersionManagerState,
};

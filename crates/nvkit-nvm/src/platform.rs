use std::path::PathBuf;

use nvkit_backend::{ToolInvocation, VersionIdentifier};

use crate::version::{
    parse_bare_current, parse_marked_current, parse_posix_available, parse_posix_installed,
    parse_windows_available, parse_windows_installed,
};

/// One operation of the underlying tool. The platform strategy decides the
/// argument spelling; the client decides when to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NvmAction {
    /// Bare invocation used to check the tool answers at all.
    Probe,
    /// Version of the tool itself, not of any Node installation.
    ToolVersion,
    Current,
    ListInstalled,
    ListAvailable,
    Install(VersionIdentifier),
    SetDefault(VersionIdentifier),
    Uninstall(VersionIdentifier),
}

/// Platform-specific spelling of tool commands and shape of tool output.
/// Selected once when the client is built, never re-decided per call.
pub trait PlatformCommands: Send + Sync {
    fn invocation(&self, action: &NvmAction) -> ToolInvocation;
    fn parse_current(&self, stdout: &str) -> Option<VersionIdentifier>;
    fn parse_installed(&self, stdout: &str) -> Vec<VersionIdentifier>;
    fn parse_available(&self, stdout: &str) -> Vec<VersionIdentifier>;
}

/// `nvm` as a sourced shell function (Linux, macOS). Every call goes through
/// `bash` with a preamble that sources `nvm.sh` from the configured
/// directory, since the function does not exist outside an interactive
/// shell.
#[derive(Debug, Clone)]
pub struct PosixNvm {
    nvm_dir: PathBuf,
}

impl PosixNvm {
    #[must_use]
    pub fn new(nvm_dir: PathBuf) -> Self {
        Self { nvm_dir }
    }

    fn nvm_args(action: &NvmAction) -> Vec<String> {
        match action {
            NvmAction::Probe => vec![],
            NvmAction::ToolVersion => vec!["--version".into()],
            NvmAction::Current => vec!["current".into()],
            NvmAction::ListInstalled => vec!["ls".into()],
            NvmAction::ListAvailable => vec!["ls-remote".into()],
            NvmAction::Install(version) => vec!["install".into(), version.to_string()],
            NvmAction::SetDefault(version) => {
                vec!["alias".into(), "default".into(), version.to_string()]
            }
            NvmAction::Uninstall(version) => vec!["uninstall".into(), version.to_string()],
        }
    }
}

impl PlatformCommands for PosixNvm {
    fn invocation(&self, action: &NvmAction) -> ToolInvocation {
        let script = format!(
            "export NVM_DIR=\"{}\"; [ -s \"$NVM_DIR/nvm.sh\" ] && \\. \"$NVM_DIR/nvm.sh\"; nvm \"$@\"",
            self.nvm_dir.display(),
        );

        ToolInvocation::new("bash")
            .args(["-c", &script, "bash"])
            .args(Self::nvm_args(action))
            .env("TERM", "dumb")
            .env("NO_COLOR", "1")
    }

    fn parse_current(&self, stdout: &str) -> Option<VersionIdentifier> {
        parse_bare_current(stdout)
    }

    fn parse_installed(&self, stdout: &str) -> Vec<VersionIdentifier> {
        parse_posix_installed(stdout)
    }

    fn parse_available(&self, stdout: &str) -> Vec<VersionIdentifier> {
        parse_posix_available(stdout)
    }
}

/// nvm-windows, a standalone executable with its own command set: `version`
/// instead of `--version`, `use` instead of a default alias, and unprefixed
/// version tokens in listings.
#[derive(Debug, Clone)]
pub struct WindowsNvm {
    nvm_exe: PathBuf,
}

impl WindowsNvm {
    #[must_use]
    pub fn new(nvm_exe: PathBuf) -> Self {
        Self { nvm_exe }
    }

    fn nvm_args(action: &NvmAction) -> Vec<String> {
        match action {
            NvmAction::Probe => vec![],
            NvmAction::ToolVersion => vec!["version".into()],
            NvmAction::Current | NvmAction::ListInstalled => vec!["list".into()],
            NvmAction::ListAvailable => vec!["list".into(), "available".into()],
            NvmAction::Install(version) => vec!["install".into(), version.to_string()],
            NvmAction::SetDefault(version) => vec!["use".into(), version.to_string()],
            NvmAction::Uninstall(version) => vec!["uninstall".into(), version.to_string()],
        }
    }
}

impl PlatformCommands for WindowsNvm {
    fn invocation(&self, action: &NvmAction) -> ToolInvocation {
        ToolInvocation::new(self.nvm_exe.to_string_lossy()).args(Self::nvm_args(action))
    }

    fn parse_current(&self, stdout: &str) -> Option<VersionIdentifier> {
        parse_marked_current(stdout)
    }

    fn parse_installed(&self, stdout: &str) -> Vec<VersionIdentifier> {
        parse_windows_installed(stdout)
    }

    fn parse_available(&self, stdout: &str) -> Vec<VersionIdentifier> {
        parse_windows_available(stdout)
    }
}

use std::path::PathBuf;

use log::debug;
use which::which;

pub const NVM_POSIX_REPO_URL: &str = "https://github.com/nvm-sh/nvm";
pub const NVM_WINDOWS_REPO_URL: &str = "https://github.com/coreybutler/nvm-windows";

/// A located installation of the tool. The two variants are different
/// programs that happen to share a name: POSIX `nvm` is a shell function
/// sourced from a directory, nvm-windows is a standalone executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NvmInstallation {
    Posix { nvm_dir: PathBuf },
    Windows { nvm_exe: PathBuf },
}

impl NvmInstallation {
    #[must_use]
    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows { .. })
    }

    /// Project page of the matching tool, for hosts that want to point users
    /// at installation instructions.
    #[must_use]
    pub fn repo_url(&self) -> &'static str {
        match self {
            Self::Posix { .. } => NVM_POSIX_REPO_URL,
            Self::Windows { .. } => NVM_WINDOWS_REPO_URL,
        }
    }

    /// Installation assumed when detection finds nothing: the conventional
    /// location for the host platform. Commands built against it will fail
    /// and the probe reports the tool as missing, which is the signal hosts
    /// use to surface [`repo_url`](Self::repo_url).
    #[must_use]
    pub fn fallback() -> Self {
        if cfg!(windows) {
            Self::Windows {
                nvm_exe: PathBuf::from("nvm.exe"),
            }
        } else {
            let nvm_dir = std::env::var("NVM_DIR")
                .map(PathBuf::from)
                .ok()
                .or_else(|| dirs::home_dir().map(|home| home.join(".nvm")))
                .unwrap_or_else(|| PathBuf::from(".nvm"));
            Self::Posix { nvm_dir }
        }
    }
}

/// Locates the tool for the current platform. Explicit overrides from
/// settings win over environment variables, which win over the conventional
/// install locations.
#[must_use]
pub fn detect_installation(
    nvm_dir_override: Option<PathBuf>,
    nvm_exe_override: Option<PathBuf>,
) -> Option<NvmInstallation> {
    let installation = if cfg!(windows) {
        detect_windows(nvm_exe_override)
    } else {
        detect_posix(nvm_dir_override)
    };

    match &installation {
        Some(found) => debug!("Detected nvm installation: {found:?}"),
        None => debug!("No nvm installation found"),
    }

    installation
}

fn detect_posix(nvm_dir_override: Option<PathBuf>) -> Option<NvmInstallation> {
    let mut candidates = Vec::new();

    if let Some(dir) = nvm_dir_override {
        candidates.push(dir);
    }
    if let Ok(dir) = std::env::var("NVM_DIR") {
        candidates.push(PathBuf::from(dir));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".nvm"));
    }

    select_nvm_dir(candidates).map(|nvm_dir| NvmInstallation::Posix { nvm_dir })
}

fn detect_windows(nvm_exe_override: Option<PathBuf>) -> Option<NvmInstallation> {
    let mut candidates = Vec::new();

    if let Some(path) = nvm_exe_override {
        candidates.push(path);
    }
    if let Ok(home) = std::env::var("NVM_HOME") {
        candidates.push(PathBuf::from(home).join("nvm.exe"));
    }

    select_nvm_exe(candidates)
        .or_else(|| which("nvm").ok())
        .map(|nvm_exe| NvmInstallation::Windows { nvm_exe })
}

/// A directory only counts as an nvm dir when it holds `nvm.sh`, since that
/// is the script the command preamble sources.
fn select_nvm_dir(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|dir| dir.join("nvm.sh").is_file())
}

fn select_nvm_exe(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Pseudo-version some tools report when the system-provided Node
/// installation is selected instead of a managed one.
pub const SYSTEM_VERSION: &str = "system";

/// A version exactly as the underlying tool printed it, for example
/// `v20.11.0` or `18.17.0`. No normalization beyond trimming: the token is
/// passed back to the tool verbatim, so `v18.17.0` and `18.17.0` are
/// distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIdentifier(String);

impl VersionIdentifier {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self(token.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_VERSION
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionIdentifier {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for VersionIdentifier {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl AsRef<str> for VersionIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One row of a host's version tree: the display label plus whether the
/// version is the currently active one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionItem {
    pub label: String,
    pub is_active: bool,
}

/// Last-fetched view of the tool's version store.
///
/// Two invariants hold at all times: `available` never overlaps `installed`,
/// and `current` is only set when it appears in `installed`. The cache is
/// rebuilt by the fetch operations and cleared wholesale after any mutating
/// call, never persisted.
#[derive(Debug, Clone, Default)]
pub struct VersionManagerState {
    current: Option<VersionIdentifier>,
    installed: Vec<VersionIdentifier>,
    available: Vec<VersionIdentifier>,
    installed_set: HashSet<VersionIdentifier>,
}

impl VersionManagerState {
    #[must_use]
    pub fn current(&self) -> Option<&VersionIdentifier> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn installed(&self) -> &[VersionIdentifier] {
        &self.installed
    }

    #[must_use]
    pub fn available(&self) -> &[VersionIdentifier] {
        &self.available
    }

    #[must_use]
    pub fn is_installed(&self, version: &VersionIdentifier) -> bool {
        self.installed_set.contains(version)
    }

    #[must_use]
    pub fn is_available(&self, version: &VersionIdentifier) -> bool {
        self.available.contains(version)
    }

    /// Replaces the installed list. The available list is re-filtered against
    /// the new set, and a current version that is no longer installed is
    /// dropped.
    pub fn record_installed(&mut self, versions: Vec<VersionIdentifier>) {
        self.installed_set = versions.iter().cloned().collect();
        self.installed = versions;
        self.available
            .retain(|version| !self.installed_set.contains(version));
        if let Some(current) = &self.current
            && !self.installed_set.contains(current)
        {
            self.current = None;
        }
    }

    /// Replaces the available list, subtracting anything already installed.
    /// Order of the surviving entries is preserved.
    pub fn record_available(&mut self, versions: Vec<VersionIdentifier>) {
        self.available = versions
            .into_iter()
            .filter(|version| !self.installed_set.contains(version))
            .collect();
    }

    /// Records the active version. A token that is not in the installed list
    /// is discarded so the cache never points at a version it does not know.
    pub fn record_current(&mut self, current: Option<VersionIdentifier>) {
        self.current = current.filter(|version| self.installed_set.contains(version));
    }

    /// Drops every cached list. Called after any mutating tool call, since
    /// the lists on disk no longer match what was last fetched.
    pub fn invalidate(&mut self) {
        self.current = None;
        self.installed.clear();
        self.available.clear();
        self.installed_set.clear();
    }
}

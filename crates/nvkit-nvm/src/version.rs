use std::sync::OnceLock;

use regex::Regex;

use nvkit_backend::{SYSTEM_VERSION, VersionIdentifier};

fn posix_available_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"v\d\d\.\d\d\.\d").expect("literal pattern is valid"))
}

fn posix_installed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"v\d+\.\d+\.\d+|system").expect("literal pattern is valid"))
}

fn windows_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+|system").expect("literal pattern is valid"))
}

fn ansi_escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("literal pattern is valid"))
}

/// Strips carriage returns and ANSI escape sequences so the parsers only see
/// plain text. `nvm` colors its listings even with a dumb terminal on some
/// setups.
pub(crate) fn clean_output(raw: &str) -> String {
    let without_ansi = ansi_escape_pattern().replace_all(raw, "");
    without_ansi.replace('\r', "")
}

fn scan(pattern: &Regex, output: &str) -> Vec<VersionIdentifier> {
    pattern
        .find_iter(output)
        .map(|m| VersionIdentifier::new(m.as_str()))
        .collect()
}

/// Everything from the first `system` token onward is footer noise: the
/// listing prints managed versions first, then the system entry, then alias
/// lines whose targets would otherwise be picked up as versions again.
fn truncate_at_system(tokens: Vec<VersionIdentifier>) -> Vec<VersionIdentifier> {
    match tokens.iter().position(VersionIdentifier::is_system) {
        Some(index) => tokens.into_iter().take(index).collect(),
        None => tokens,
    }
}

/// Versions from `nvm ls-remote`. The pattern only admits two-digit major and
/// minor components, which keeps ancient pre-1.0 releases out of the list.
pub(crate) fn parse_posix_available(output: &str) -> Vec<VersionIdentifier> {
    scan(posix_available_pattern(), output)
}

/// Installed versions from `nvm ls`, minus the system entry and the alias
/// footer after it.
pub(crate) fn parse_posix_installed(output: &str) -> Vec<VersionIdentifier> {
    truncate_at_system(scan(posix_installed_pattern(), output))
}

/// Installed versions from `nvm list` on Windows, where tokens carry no `v`
/// prefix.
pub(crate) fn parse_windows_installed(output: &str) -> Vec<VersionIdentifier> {
    truncate_at_system(scan(windows_version_pattern(), output))
}

/// Versions from `nvm list available` on Windows. The table includes the
/// old 0.x column, which nvm-windows cannot install on modern systems, so
/// those tokens are dropped.
pub(crate) fn parse_windows_available(output: &str) -> Vec<VersionIdentifier> {
    scan(windows_version_pattern(), output)
        .into_iter()
        .filter(|version| !version.is_system() && !version.as_str().starts_with("0."))
        .collect()
}

/// The active version in a Windows `nvm list`, marked with a `*` in front of
/// the token.
pub(crate) fn parse_marked_current(output: &str) -> Option<VersionIdentifier> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix('*'))
        .and_then(|rest| rest.split_whitespace().next())
        .map(VersionIdentifier::new)
}

/// The bare token printed by `nvm current`. Empty output and the `none` and
/// `system` sentinels all mean no managed version is active.
pub(crate) fn parse_bare_current(output: &str) -> Option<VersionIdentifier> {
    let token = output.trim().split_whitespace().next().unwrap_or("");

    if token.is_empty() || token == "none" || token == SYSTEM_VERSION {
        None
    } else {
        Some(VersionIdentifier::new(token))
    }
}

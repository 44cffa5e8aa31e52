use semver::Version;
use serde::Deserialize;

use nvkit_backend::BackendError;

use crate::detection::NvmInstallation;

const NVM_POSIX_REPO: &str = "nvm-sh/nvm";
const NVM_WINDOWS_REPO: &str = "coreybutler/nvm-windows";
const USER_AGENT: &str = "nvkit";

/// A newer release of the tool itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolUpdate {
    pub current_version: String,
    pub latest_version: String,
    pub release_url: String,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    html_url: String,
}

fn update_check_error(error: reqwest::Error) -> BackendError {
    BackendError::network("nvm update check", error.to_string())
}

/// Checks GitHub for a newer release of the installed tool. `Ok(None)` means
/// up to date, or that GitHub answered with a non-success status (rate
/// limiting is not worth surfacing to users).
///
/// # Errors
/// Returns an error when the request cannot be sent or the response body is
/// not a release object.
pub async fn check_for_tool_update(
    client: &reqwest::Client,
    current_version: &str,
    installation: &NvmInstallation,
) -> Result<Option<ToolUpdate>, BackendError> {
    let repo = if installation.is_windows() {
        NVM_WINDOWS_REPO
    } else {
        NVM_POSIX_REPO
    };

    let request = client
        .get(format!("https://api.github.com/repos/{repo}/releases/latest"))
        .header(reqwest::header::USER_AGENT, USER_AGENT);

    let response = request.send().await.map_err(update_check_error)?;
    if !response.status().is_success() {
        return Ok(None);
    }

    let release: GitHubRelease = response.json().await.map_err(update_check_error)?;
    Ok(update_from_release(&release, current_version))
}

fn trim_tag(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

fn update_from_release(release: &GitHubRelease, current_version: &str) -> Option<ToolUpdate> {
    let latest = trim_tag(&release.tag_name);
    let current = trim_tag(current_version);

    if !is_newer_version(latest, current) {
        return None;
    }
    Some(ToolUpdate {
        current_version: current.to_string(),
        latest_version: latest.to_string(),
        release_url: release.html_url.clone(),
    })
}

fn is_newer_version(latest: &str, current: &str) -> bool {
    let (Some(parsed_latest), Some(parsed_current)) =
        (parse_semver(latest), parse_semver(current))
    else {
        // Tags that defy parsing still flag an update when they differ.
        return latest != current;
    };
    parsed_latest > parsed_current
}

/// `Version::parse` with missing minor/patch components padded with zeros,
/// since nvm-windows has shipped two-part tags.
fn parse_semver(version: &str) -> Option<Version> {
    if let Ok(parsed) = Version::parse(version) {
        return Some(parsed);
    }

    let suffix_start = version.find(['-', '+']).unwrap_or(version.len());
    let (numbers, suffix) = version.split_at(suffix_start);

    let mut components = [0_u64; 3];
    for (index, piece) in numbers.split('.').enumerate() {
        if index >= components.len() {
            return None;
        }
        components[index] = piece.parse().ok()?;
    }
    let [major, minor, patch] = components;

    Version::parse(&format!("{major}.{minor}.{patch}{suffix}")).ok()
}

//! Two-tier resolution of supported Kubernetes versions
//!
//! Primary source is the support matrix on the Talos documentation site;
//! the GitHub release notes are the fallback. A failed or empty primary
//! silently hands over to the fallback - only both sources coming up dry
//! is fatal. Remote calls are blocking, bounded by a fixed timeout, and
//! never retried.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use crate::error::{Result, SyncError};
use crate::matrix;
use crate::releases::{self, Release};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const RELEASES_URL: &str = "https://api.github.com/repos/siderolabs/talos/releases";

fn support_matrix_url(talos_minor: &str) -> String {
    format!(
        "https://www.talos.dev/v{}/introduction/support-matrix/",
        talos_minor
    )
}

fn http_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(format!(
            "{}/{} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_REPOSITORY")
        ))
        .timeout(FETCH_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Resolve the Kubernetes versions supported by the given Talos minor
/// version, as an ascending list of minor-version strings (e.g.
/// `["30", "31", "32"]`).
pub fn resolve_supported_versions(talos_minor: &str) -> Result<Vec<String>> {
    let client = http_client()?;
    resolve_with(
        talos_minor,
        || fetch_matrix_versions(&client, talos_minor),
        || fetch_release_versions(&client, talos_minor),
    )
}

/// The fallback chain, with the two sources injected so it can be
/// exercised without touching the network.
fn resolve_with<P, F>(talos_minor: &str, primary: P, fallback: F) -> Result<Vec<String>>
where
    P: FnOnce() -> Result<BTreeSet<u32>>,
    F: FnOnce() -> Result<BTreeSet<u32>>,
{
    let mut versions = match primary() {
        Ok(versions) => versions,
        Err(e) => {
            log::warn!("support matrix unavailable: {}", e);
            BTreeSet::new()
        }
    };

    if versions.is_empty() {
        log::info!("support matrix yielded nothing, trying fallback");
        versions = match fallback() {
            Ok(versions) => versions,
            Err(e) => {
                log::warn!("release-notes fallback failed: {}", e);
                BTreeSet::new()
            }
        };
    }

    if versions.is_empty() {
        return Err(SyncError::VersionResolutionFailed(talos_minor.to_string()));
    }

    // BTreeSet iterates ascending, which fixes the output order
    Ok(versions.iter().map(|v| v.to_string()).collect())
}

fn fetch_matrix_versions(client: &Client, talos_minor: &str) -> Result<BTreeSet<u32>> {
    let url = support_matrix_url(talos_minor);
    log::info!("fetching support matrix from {}", url);

    let response = client.get(&url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::RemoteFetch(format!(
            "{} returned status {}",
            url, status
        )));
    }

    let html = response.text()?;
    log::debug!("HTTP {} - got {} bytes", status, html.len());

    Ok(matrix::scan_support_matrix(&html, talos_minor))
}

fn fetch_release_versions(client: &Client, talos_minor: &str) -> Result<BTreeSet<u32>> {
    log::info!("fetching release list from {}", RELEASES_URL);

    let mut request = client
        .get(RELEASES_URL)
        .header(ACCEPT, "application/vnd.github.v3+json");
    if let Ok(token) = std::env::var("GITHUB_TOKEN")
        && !token.is_empty()
    {
        request = request.header(AUTHORIZATION, format!("token {}", token));
    }

    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::RemoteFetch(format!(
            "GitHub API returned status {}",
            status
        )));
    }

    let releases: Vec<Release> = response.json()?;
    releases::scan_release_notes(&releases, talos_minor)
}

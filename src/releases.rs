//! Release-notes fallback for the support matrix
//!
//! When the documentation site is unreachable or its table yields nothing,
//! the Talos GitHub release notes are the secondary source: every release
//! announces the Kubernetes versions it ships against somewhere in its
//! free-text body.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, SyncError};

static K8S_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)kubernetes").unwrap());

/// Version mentions like "1.33" or "v1.33" following a Kubernetes word
static NOTES_VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bv?1\.(\d+)").unwrap());

const MIN_K8S_MINOR: u32 = 30;

/// One release record from the GitHub releases API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub body: String,
}

/// Extract supported Kubernetes versions from the release notes of the
/// latest release for the given Talos minor version.
///
/// Precondition: `releases` is ordered newest-first, as returned by the
/// GitHub API - the first tag matching `v<minor>.` is taken as the latest
/// release of that series.
pub fn scan_release_notes(releases: &[Release], talos_minor: &str) -> Result<BTreeSet<u32>> {
    let prefix = format!("v{}.", talos_minor);
    let release = releases
        .iter()
        .find(|r| r.tag_name.starts_with(&prefix))
        .ok_or_else(|| SyncError::NoMatchingRelease(talos_minor.to_string()))?;

    log::info!("found release: {}", release.tag_name);
    log::debug!("searching release notes for Kubernetes versions");

    // A single mention of Kubernetes often announces several versions
    // ("ships Kubernetes v1.33 and v1.34"), so every version after the
    // word counts, not just the nearest one.
    let mut versions = BTreeSet::new();
    for line in release.body.lines() {
        let Some(word) = K8S_WORD_RE.find(line) else {
            continue;
        };
        versions.extend(
            NOTES_VERSION_RE
                .captures_iter(&line[word.end()..])
                .filter_map(|captures| captures[1].parse::<u32>().ok())
                .filter(|minor| *minor >= MIN_K8S_MINOR),
        );
    }

    if versions.is_empty() {
        return Err(SyncError::NoVersionsInNotes(release.tag_name.clone()));
    }

    log::info!("found in release notes: {:?}", versions);
    Ok(versions)
}

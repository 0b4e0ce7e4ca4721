//! Renovate policy file updates
//!
//! The policy file (renovate.json5) is deliberately treated as an opaque
//! text blob: it carries comments and hand-formatted sections that a
//! structural parse-and-reserialize would destroy. The constraint is
//! located by pattern, and only the quoted constraint value plus the tail
//! of one documentation comment are ever rewritten - every other byte is
//! preserved.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Result, SyncError};

/// The kubernetes-components package rule, up to its allowedVersions value
static CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(groupName:\s*['"]kubernetes-components['"],[\s\S]*?allowedVersions:\s*)['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

/// The "// 3. Current:" comment documenting the supported versions
static CURRENT_COMMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(//\s*3\.\s*Current:.*?)Talos \d+\.\d+\.x supports Kubernetes.*").unwrap()
});

/// Whether running the updater changed the policy file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    AlreadyCurrent,
}

/// Build the allowedVersions pattern for a set of Kubernetes minor
/// versions.
///
/// Alternatives are emitted in ascending numeric order regardless of input
/// order, so the same set always serializes to the same pattern. A single
/// version collapses to the non-alternative form.
pub fn build_allowed_versions(versions: &[String]) -> String {
    let mut minors: Vec<u32> = versions.iter().filter_map(|v| v.parse().ok()).collect();
    minors.sort_unstable();
    minors.dedup();

    if minors.len() == 1 {
        format!(r"/^v1\.{}\./", minors[0])
    } else {
        let alternatives = minors
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("|");
        format!(r"/^v1\.({})\./", alternatives)
    }
}

/// Human-readable support summary for the documentation comment
fn support_summary(talos_minor: &str, versions: &[String]) -> String {
    let list = versions
        .iter()
        .map(|v| format!("1.{}.x", v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Talos {}.x supports Kubernetes {}", talos_minor, list)
}

/// Apply the constraint update to policy text.
///
/// Returns `None` when the kubernetes-components block is missing, and the
/// rewritten text plus outcome otherwise. `AlreadyCurrent` returns the
/// input unchanged.
fn apply_update(
    content: &str,
    talos_minor: &str,
    versions: &[String],
) -> Option<(String, UpdateOutcome)> {
    let allowed = build_allowed_versions(versions);
    log::info!("generated allowedVersions constraint: {}", allowed);

    let captures = CONSTRAINT_RE.captures(content)?;
    let current = captures[2].trim_matches(|c| c == '\'' || c == '"');
    log::info!("current constraint: {}", current);

    if current == allowed {
        return Some((content.to_string(), UpdateOutcome::AlreadyCurrent));
    }

    let updated = CONSTRAINT_RE.replace(content, |caps: &Captures<'_>| {
        format!("{}'{}'", &caps[1], allowed)
    });

    let summary = support_summary(talos_minor, versions);
    let updated = CURRENT_COMMENT_RE.replace(&updated, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], summary)
    });

    Some((updated.into_owned(), UpdateOutcome::Updated))
}

/// Update the allowedVersions constraint in the policy file at `path`.
///
/// The file is rewritten in place only when the constraint actually
/// changes; with `dry_run` the new content is computed but never written.
pub fn update_policy_file(
    path: &Path,
    talos_minor: &str,
    versions: &[String],
    dry_run: bool,
) -> Result<UpdateOutcome> {
    if !path.exists() {
        return Err(SyncError::ConfigMissing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;

    let (updated, outcome) = apply_update(&content, talos_minor, versions)
        .ok_or_else(|| SyncError::ConstraintBlockNotFound(path.to_path_buf()))?;

    match outcome {
        UpdateOutcome::AlreadyCurrent => {
            log::info!("constraint is already up to date");
        }
        UpdateOutcome::Updated if dry_run => {
            log::info!("dry run: leaving {} untouched", path.display());
        }
        UpdateOutcome::Updated => {
            fs::write(path, updated)?;
            log::info!("updated {}", path.display());
        }
    }

    Ok(outcome)
}

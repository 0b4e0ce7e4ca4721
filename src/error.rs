//! Error types for the constraint sync tool
//!
//! Provides structured error types for the whole pipeline, from reading the
//! cluster config through rewriting the Renovate policy file.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while synchronizing the Kubernetes constraint
#[derive(Debug, Error)]
pub enum SyncError {
    /// An input file could not be found
    #[error("could not find {0} - run from the repository root")]
    ConfigMissing(PathBuf),

    /// The cluster config exists but the Talos version could not be read from it
    #[error("malformed cluster config: {0}")]
    ConfigMalformed(String),

    /// A Talos version given on the command line is not in X.Y form
    #[error("invalid Talos version format: {0} (expected X.Y, e.g. 1.12)")]
    InvalidVersionFormat(String),

    /// A remote fetch failed (network error, timeout, non-2xx status).
    /// Absorbed by the resolver's fallback chain, never surfaced to the user.
    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),

    /// No release in the GitHub release list matches the Talos minor version
    #[error("no release found for Talos v{0}")]
    NoMatchingRelease(String),

    /// A matching release was found but its notes mention no usable Kubernetes version
    #[error("no Kubernetes versions found in release notes for {0}")]
    NoVersionsInNotes(String),

    /// Both the support matrix and the release-notes fallback came up empty
    #[error(
        "cannot determine supported Kubernetes versions for Talos v{0} - \
         check https://www.talos.dev/latest/introduction/support-matrix/ manually"
    )]
    VersionResolutionFailed(String),

    /// The Renovate policy file has no kubernetes-components constraint block
    #[error("could not find the kubernetes-components allowedVersions block in {0}")]
    ConstraintBlockNotFound(PathBuf),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cluster config is not valid YAML
    #[error("failed to parse cluster config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, SyncError>;

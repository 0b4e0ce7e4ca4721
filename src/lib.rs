//! # Talos Sync CLI
//!
//! A Rust-based command-line tool that keeps a Renovate policy file's
//! Kubernetes version constraints synchronized with what the cluster's
//! pinned Talos Linux release actually supports.
//!
//! ## How it works
//!
//! - **Version extraction**: reads the Talos minor version from the cluster
//!   control-plane machine config (or takes it as a CLI argument)
//! - **Resolution**: scans the Talos support matrix for the Kubernetes
//!   versions that release supports, falling back to the GitHub release
//!   notes when the matrix is unreachable or empty
//! - **Constraint rewrite**: updates the `kubernetes-components`
//!   `allowedVersions` pattern in renovate.json5, touching nothing else
//!
//! ## Example
//!
//! ```rust,no_run
//! use talos_sync_cli::{renovate, resolver};
//! use std::path::Path;
//!
//! # fn main() -> talos_sync_cli::Result<()> {
//! let supported = resolver::resolve_supported_versions("1.12")?;
//! let outcome = renovate::update_policy_file(
//!     Path::new(".github/renovate.json5"),
//!     "1.12",
//!     &supported,
//!     false,
//! )?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod cluster;
pub mod error;
pub mod matrix;
pub mod releases;
pub mod renovate;
pub mod resolver;

// Re-export commonly used types
pub use error::{Result, SyncError};
pub use renovate::UpdateOutcome;

use cli::Cli;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the full sync pipeline: determine the Talos version, resolve the
/// supported Kubernetes versions, and update the policy file.
pub fn run(cli: &Cli) -> Result<UpdateOutcome> {
    let talos_minor = match &cli.talos_version {
        Some(version) => {
            let version = cluster::validate_minor(version)?;
            if !cli.quiet {
                println!("Using Talos version from argument: v{}.x", version);
            }
            version
        }
        None => {
            let version = cluster::extract_talos_version(&cli.cluster_config)?;
            if !cli.quiet {
                println!("Current Talos version: v{}.x", version);
            }
            version
        }
    };

    let supported = resolver::resolve_supported_versions(&talos_minor)?;
    if !cli.quiet {
        let list = supported
            .iter()
            .map(|v| format!("1.{}", v))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Supported Kubernetes versions: {}", list);
    }

    renovate::update_policy_file(&cli.renovate_config, &talos_minor, &supported, cli.dry_run)
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "talos-sync-ctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync Renovate's Kubernetes constraints with the Talos support matrix")]
#[command(
    long_about = "Reads the pinned Talos Linux version from the cluster machine config (or takes \
it as an argument), looks up which Kubernetes versions that Talos release supports, and rewrites \
the kubernetes-components allowedVersions constraint in renovate.json5 accordingly.\n\n\
Exit codes: 0 = constraint updated, 1 = error, 2 = constraint already up to date."
)]
pub struct Cli {
    /// Talos minor version in X.Y form (e.g. 1.12). Read from the cluster config when omitted
    #[arg(value_name = "TALOS_VERSION")]
    pub talos_version: Option<String>,

    /// Path to the cluster control-plane machine config
    #[arg(
        long,
        value_name = "FILE",
        default_value = "tools/cluster/base-controlplane.yaml"
    )]
    pub cluster_config: PathBuf,

    /// Path to the Renovate policy file to update
    #[arg(long, value_name = "FILE", default_value = ".github/renovate.json5")]
    pub renovate_config: PathBuf,

    /// Compute and report the new constraint without writing the policy file
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

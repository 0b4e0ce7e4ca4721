use clap::Parser;
use colored::Colorize;
use std::process;

use talos_sync_cli::UpdateOutcome;
use talos_sync_cli::cli::Cli;

fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    match talos_sync_cli::run(&cli) {
        Ok(UpdateOutcome::Updated) => {
            if !cli.quiet {
                if cli.dry_run {
                    println!(
                        "{} Constraint is out of date (dry run, {} left untouched)",
                        "✓".green(),
                        cli.renovate_config.display()
                    );
                } else {
                    println!("{} Updated {}", "✓".green(), cli.renovate_config.display());
                }
            }
        }
        Ok(UpdateOutcome::AlreadyCurrent) => {
            if !cli.quiet {
                println!(
                    "{} No changes needed - constraint already matches the Talos support matrix",
                    "✓".green()
                );
            }
            process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

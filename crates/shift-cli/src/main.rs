//! kubeshift CLI
//!
//! Command-line entry point: parses arguments, installs logging and
//! dispatches to the command implementations.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use shift_core::ConfigOverrides;

use cli::{Cli, Commands};
use commands::ConfigSources;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;
    execute_command(cli)
}

fn execute_command(cli: Cli) -> Result<()> {
    let global_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Transform {
            source,
            output,
            target,
            name,
            config,
            max_passes,
            selector,
            json,
        } => {
            let overrides = ConfigOverrides {
                name,
                target,
                max_passes,
                selector,
            };
            let sources = ConfigSources {
                global_dir,
                file: config.as_deref(),
            };
            commands::run_transform(&source, &output, sources, &overrides, json)
        }
        Commands::Plan {
            source,
            name,
            config,
            format,
        } => {
            let overrides = ConfigOverrides {
                name,
                ..Default::default()
            };
            let sources = ConfigSources {
                global_dir,
                file: config.as_deref(),
            };
            commands::run_plan(&source, sources, &overrides, format)
        }
        Commands::Delta {
            source,
            destination,
            store,
        } => commands::run_delta(&source, &destination, &store),
    }
}

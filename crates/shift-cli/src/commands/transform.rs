//! Transform command implementation

use std::path::Path;

use colored::Colorize;
use shift_core::{ConfigOverrides, Pipeline, PipelineReport, PluginRegistry};

use super::{ConfigSources, load_config};
use crate::error::Result;

/// Run the full pipeline from `source` onto `output`.
///
/// Mappings that fail are reported but do not fail the command; only an
/// unusable root or a plugin contract violation does.
pub fn run_transform(
    source: &Path,
    output: &Path,
    sources: ConfigSources<'_>,
    overrides: &ConfigOverrides,
    json: bool,
) -> Result<()> {
    let config = load_config(source, sources, overrides)?;
    let registry = PluginRegistry::with_builtins();
    let pipeline = Pipeline::new(&registry, config)?;

    let report = pipeline.run(source, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!(
        "{} {} -> {}",
        "Transformed".green().bold(),
        report.source_root.display(),
        report.output_root.display()
    );
    println!();

    println!("{}:", "Services".bold());
    if report.services.is_empty() {
        println!("  {}", "None detected".dimmed());
    }
    for service in &report.services {
        println!("  {} {}", "+".green(), service.name.cyan());
    }
    println!();

    println!(
        "{}: {}   {}: {}   {}: {}",
        "Passes".dimmed(),
        report.passes,
        "Artifacts".dimmed(),
        report.artifacts,
        "Mappings".dimmed(),
        report.path_mappings
    );
    if report.truncated {
        println!("{}", "Pass limit reached before the pipeline settled".yellow());
    }

    if !report.is_complete() {
        println!();
        println!("{}:", "Not applied".yellow().bold());
        for error in &report.resolution.errors {
            println!("  {} {}", "!".yellow(), error);
        }
    }
}

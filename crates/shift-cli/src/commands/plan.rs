//! Plan command implementation

use std::path::Path;

use colored::Colorize;
use shift_core::artifact::roles;
use shift_core::{ConfigOverrides, Pipeline, Plan, PluginRegistry};

use super::{ConfigSources, load_config};
use crate::cli::OutputFormat;
use crate::error::Result;

/// Detect and name the services of `source` and print them.
pub fn run_plan(source: &Path, sources: ConfigSources<'_>, overrides: &ConfigOverrides, format: OutputFormat) -> Result<()> {
    let config = load_config(source, sources, overrides)?;
    let registry = PluginRegistry::with_builtins();
    let plan = Pipeline::new(&registry, config)?.plan(source)?;

    match format {
        OutputFormat::Text => print_plan(&plan),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&plan)?),
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    println!("{}:  {}", "Project".dimmed(), plan.project.cyan());
    println!("{}:   {}", "Source".dimmed(), plan.source_root.display());
    println!();

    println!("{}:", "Services".bold());
    if plan.services.is_empty() {
        println!("  {}", "None detected".dimmed());
        return;
    }
    for (name, hits) in &plan.services {
        println!("  {} {}", "+".green(), name.cyan());
        for hit in hits {
            for dir in hit.paths(roles::SERVICE_DIRECTORY) {
                let shown = dir.strip_prefix(&plan.source_root).unwrap_or(dir);
                println!("      {} {}", hit.kind.dimmed(), shown.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shift_test_utils::tree::TestTree;

    #[test]
    fn plan_writes_nothing() {
        let src = TestTree::new();
        src.service("api", "FROM scratch\n");
        let global = TestTree::new();
        let before = src.entries();

        let sources = ConfigSources {
            global_dir: Some(global.root()),
            file: None,
        };
        run_plan(src.root(), sources, &ConfigOverrides::default(), OutputFormat::Json).unwrap();

        assert_eq!(src.entries(), before);
    }

    #[test]
    fn missing_explicit_config_fails() {
        let src = TestTree::new();
        let global = TestTree::new();
        let missing = src.path("missing.toml");
        let sources = ConfigSources {
            global_dir: Some(global.root()),
            file: Some(&missing),
        };
        assert!(run_plan(src.root(), sources, &ConfigOverrides::default(), OutputFormat::Text).is_err());
    }
}

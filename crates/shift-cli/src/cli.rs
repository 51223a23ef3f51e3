//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// kubeshift - Turn a source tree into deployable services
#[derive(Parser, Debug)]
#[command(name = "kubeshift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding the global config.toml
    #[arg(long, global = true, env = "KUBESHIFT_CONFIG_DIR", hide = true)]
    pub config_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Detect services and write generated artifacts to the output directory
    ///
    /// Examples:
    ///   kubeshift transform -s ./shop -o ./out
    ///   kubeshift transform -s ./shop -o ./out -t kubernetes -n shop
    Transform {
        /// Source directory to analyse
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory receiving the generated tree
        #[arg(short, long)]
        output: PathBuf,

        /// Deployment target
        #[arg(short, long)]
        target: Option<String>,

        /// Project name used when naming services
        #[arg(short, long)]
        name: Option<String>,

        /// Extra config file, applied after the project config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Upper bound on transform passes
        #[arg(long)]
        max_passes: Option<usize>,

        /// Label selector restricting the plugins that run
        #[arg(long)]
        selector: Option<String>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the services that would be generated, without writing anything
    Plan {
        /// Source directory to analyse
        #[arg(short, long)]
        source: PathBuf,

        /// Project name used when naming services
        #[arg(short, long)]
        name: Option<String>,

        /// Extra config file, applied after the project config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Record how a destination tree differs from a source tree
    ///
    /// Writes additions/, modifications/ and deletions.txt under the store.
    Delta {
        /// Tree holding the new state
        #[arg(long)]
        source: PathBuf,

        /// Tree holding the old state
        #[arg(long)]
        destination: PathBuf,

        /// Directory receiving the change set
        #[arg(long)]
        store: PathBuf,
    },
}

/// Output format for `plan`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_transform_short_flags() {
        let cli = Cli::parse_from(["kubeshift", "transform", "-s", "src", "-o", "out", "-t", "knative", "-n", "shop"]);
        assert!(matches!(
            cli.command,
            Commands::Transform { ref source, ref output, ref target, ref name, max_passes: None, json: false, .. }
                if source == &PathBuf::from("src")
                    && output == &PathBuf::from("out")
                    && target.as_deref() == Some("knative")
                    && name.as_deref() == Some("shop")
        ));
    }

    #[test]
    fn parse_plan_defaults_to_text() {
        let cli = Cli::parse_from(["kubeshift", "plan", "-s", "."]);
        assert!(matches!(cli.command, Commands::Plan { format: OutputFormat::Text, .. }));
    }

    #[test]
    fn parse_plan_yaml() {
        let cli = Cli::parse_from(["kubeshift", "plan", "-s", ".", "--format", "yaml"]);
        assert!(matches!(cli.command, Commands::Plan { format: OutputFormat::Yaml, .. }));
    }

    #[test]
    fn parse_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["kubeshift", "delta", "--source", "a", "--destination", "b", "--store", "c", "-v"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["kubeshift", "-v", "-q", "plan", "-s", "."]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["kubeshift"]).is_err());
    }
}

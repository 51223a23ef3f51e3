//! Pipeline configuration
//!
//! Loaded from layered `kubeshift.toml`-style files by [`ConfigResolver`]
//! and finally overridden by command-line values.

mod resolver;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use resolver::{CONFIG_FILE_NAME, ConfigResolver, PROJECT_CONFIG_FILE};

/// Effective configuration of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub project: ProjectConfig,
    pub pipeline: PipelineSettings,
    pub detect: DetectConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name; defaults to the source directory name
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    /// Deployment target plugins are selected for
    pub target: String,
    /// Upper bound on transform passes
    pub max_passes: usize,
    /// Additional label selector plugins must satisfy
    pub selector: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            target: "kubernetes".to_string(),
            max_passes: 16,
            selector: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectConfig {
    /// Gitignore-style patterns excluded from detection
    pub ignore: Vec<String>,
    /// Per-directory ignore file name honoured during the walk
    pub ignore_file: String,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            ignore_file: ".kubeshiftignore".to_string(),
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub name: Option<String>,
    pub target: Option<String>,
    pub max_passes: Option<usize>,
    pub selector: Option<String>,
}

impl PipelineConfig {
    /// Apply command-line overrides on top of the file layers.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(name) = &overrides.name {
            self.project.name = Some(name.clone());
        }
        if let Some(target) = &overrides.target {
            self.pipeline.target = target.clone();
        }
        if let Some(max_passes) = overrides.max_passes {
            self.pipeline.max_passes = max_passes;
        }
        if let Some(selector) = &overrides.selector {
            self.pipeline.selector = Some(selector.clone());
        }
    }

    /// Configured project name, or the final component of `source_root`.
    pub fn project_name(&self, source_root: &Path) -> String {
        self.project
            .name
            .clone()
            .or_else(|| {
                source_root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "project".to_string())
    }

    /// Config file a source tree may carry.
    pub fn project_file(source_root: &Path) -> PathBuf {
        source_root.join(PROJECT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.pipeline.target, "kubernetes");
        assert_eq!(config.pipeline.max_passes, 16);
        assert_eq!(config.detect.ignore_file, ".kubeshiftignore");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PipelineConfig = toml::from_str("[pipeline]\nmax_passes = 3\n").unwrap();
        assert_eq!(config.pipeline.max_passes, 3);
        assert_eq!(config.pipeline.target, "kubernetes");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<PipelineConfig>("[pipeline]\nmax_pass = 3\n").is_err());
    }

    #[test]
    fn overrides_win() {
        let mut config = PipelineConfig::default();
        config.apply(&ConfigOverrides {
            name: Some("shop".into()),
            max_passes: Some(2),
            ..Default::default()
        });
        assert_eq!(config.project_name(Path::new("/src/ignored")), "shop");
        assert_eq!(config.pipeline.max_passes, 2);
        assert_eq!(config.pipeline.target, "kubernetes");
    }

    #[test]
    fn project_name_falls_back_to_directory() {
        assert_eq!(PipelineConfig::default().project_name(Path::new("/src/billing")), "billing");
    }
}

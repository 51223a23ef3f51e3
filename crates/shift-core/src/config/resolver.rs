//! Configuration resolution with hierarchical merge
//!
//! Layers, later overriding earlier:
//! 1. global defaults (`<config_dir>/kubeshift/config.toml`)
//! 2. project config (`<source>/.kubeshift.toml`)
//! 3. an explicit config file
//!
//! Tables merge key by key; any other value is replaced.

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::PipelineConfig;
use crate::{Error, Result};

/// Name of the global config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the project config file at the source root.
pub const PROJECT_CONFIG_FILE: &str = ".kubeshift.toml";

/// Resolves [`PipelineConfig`] for one source tree.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    source_root: PathBuf,

    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,

    explicit_file: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            global_config_dir_override: None,
            explicit_file: None,
        }
    }

    /// Use `dir` instead of the platform config directory.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    /// Add an explicit config file as the last layer. It must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("kubeshift"))
    }

    /// Merge all layers into a [`PipelineConfig`].
    ///
    /// Missing global and project files are skipped; a missing explicit
    /// file is an error, as is invalid TOML in any layer.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut merged = Table::new();

        if let Some(dir) = self.global_config_dir() {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "Loading global config");
                merge_tables(&mut merged, load(&path)?);
            }
        }

        let project = self.source_root.join(PROJECT_CONFIG_FILE);
        if project.is_file() {
            tracing::debug!(path = %project.display(), "Loading project config");
            merge_tables(&mut merged, load(&project)?);
        }

        if let Some(path) = &self.explicit_file {
            if !path.is_file() {
                return Err(Error::ConfigNotFound { path: path.clone() });
            }
            tracing::debug!(path = %path.display(), "Loading config file");
            merge_tables(&mut merged, load(path)?);
        }

        Ok(Value::Table(merged).try_into()?)
    }
}

fn load(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path).map_err(|e| shift_fs::Error::io(path, e))?;
    Ok(content.parse::<Table>()?)
}

fn merge_tables(base: &mut Table, other: Table) {
    for (key, value) in other {
        if let Value::Table(other_table) = value {
            if let Some(Value::Table(base_table)) = base.get_mut(&key) {
                merge_tables(base_table, other_table);
                continue;
            }
            base.insert(key, Value::Table(other_table));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver(source: &Path, global: &Path) -> ConfigResolver {
        ConfigResolver::new(source).with_global_config_dir(global)
    }

    #[test]
    fn no_files_gives_defaults() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let config = resolver(source.path(), global.path()).resolve().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn later_layers_override_earlier_keys() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            global.path().join(CONFIG_FILE_NAME),
            "[pipeline]\nmax_passes = 4\ntarget = \"knative\"\n[detect]\nignore = [\"vendor/\"]\n",
        )
        .unwrap();
        fs::write(source.path().join(PROJECT_CONFIG_FILE), "[pipeline]\ntarget = \"kubernetes\"\n").unwrap();
        let explicit = source.path().join("extra.toml");
        fs::write(&explicit, "[project]\nname = \"shop\"\n").unwrap();

        let config = resolver(source.path(), global.path())
            .with_config_file(&explicit)
            .resolve()
            .unwrap();

        assert_eq!(config.pipeline.max_passes, 4);
        assert_eq!(config.pipeline.target, "kubernetes");
        assert_eq!(config.detect.ignore, vec!["vendor/".to_string()]);
        assert_eq!(config.project.name.as_deref(), Some("shop"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let err = resolver(source.path(), global.path())
            .with_config_file(source.path().join("nope.toml"))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let source = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(source.path().join(PROJECT_CONFIG_FILE), "[pipeline\n").unwrap();
        assert!(resolver(source.path(), global.path()).resolve().is_err());
    }
}

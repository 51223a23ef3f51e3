//! Plugin contract
//!
//! A plugin takes part in two phases:
//!
//! - **detect**: called once per source directory, returns detection hits
//!   keyed by service name (empty when unknown)
//! - **transform**: called once per pass with the artifacts of the kinds it
//!   consumes, returns path mappings and further artifacts
//!
//! Plugins are held by an explicit [`PluginRegistry`] handed to the
//! pipeline.

pub mod builtins;
mod registry;
mod selector;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::Result;
use crate::artifact::{Artifact, ConfigMergers, ServiceMap};
use crate::mapping::PathMapping;

pub use registry::{PluginRegistry, TARGET_LABEL};
pub use selector::{LabelSelector, Requirement};

/// How a plugin consumes one artifact kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Consumption {
    /// Artifacts handed to this plugin are withheld from later plugins in
    /// the same pass.
    pub exclusive: bool,
}

/// What a plugin consumes, produces and how it is labelled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PluginContract {
    pub consumes: BTreeMap<String, Consumption>,
    pub produces: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl PluginContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consumes(mut self, kind: &str) -> Self {
        self.consumes.insert(kind.to_string(), Consumption { exclusive: false });
        self
    }

    pub fn consumes_exclusively(mut self, kind: &str) -> Self {
        self.consumes.insert(kind.to_string(), Consumption { exclusive: true });
        self
    }

    pub fn produces(mut self, kind: &str) -> Self {
        self.produces.push(kind.to_string());
        self
    }

    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    /// Consumption declared for `kind`, if any.
    pub fn consumption(&self, kind: &str) -> Option<Consumption> {
        self.consumes.get(kind).copied()
    }
}

/// Locations a plugin may read from or stage files in.
#[derive(Debug, Clone)]
pub struct PluginEnv {
    /// Canonical root of the project being transformed
    pub source_root: PathBuf,
    /// Per-run scratch directory, removed when the run ends
    pub scratch_dir: PathBuf,
}

impl PluginEnv {
    pub fn new(source_root: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Scratch directory reserved for `plugin`, created on demand.
    pub fn scratch_for(&self, plugin: &str) -> Result<PathBuf> {
        let dir = self.scratch_dir.join(plugin);
        std::fs::create_dir_all(&dir).map_err(|e| shift_fs::Error::io(&dir, e))?;
        Ok(dir)
    }
}

/// Result of one transform call.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub path_mappings: Vec<PathMapping>,
    pub artifacts: Vec<Artifact>,
}

impl TransformOutput {
    pub fn is_empty(&self) -> bool {
        self.path_mappings.is_empty() && self.artifacts.is_empty()
    }
}

/// A detector and/or generator taking part in the pipeline.
pub trait Plugin: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    fn contract(&self) -> &PluginContract;

    /// Inspect one directory of the source tree.
    fn directory_detect(&self, _dir: &Path) -> Result<ServiceMap> {
        Ok(ServiceMap::new())
    }

    /// Process the artifacts of this pass. `new` holds the artifacts offered
    /// to this plugin, `old` the aggregate from earlier passes.
    fn transform(&self, _env: &PluginEnv, _new: &[Artifact], _old: &[Artifact]) -> Result<TransformOutput> {
        Ok(TransformOutput::default())
    }

    /// Register typed mergers for the config kinds this plugin owns.
    fn config_mergers(&self, _mergers: &mut ConfigMergers) {}
}

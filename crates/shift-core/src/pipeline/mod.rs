//! Pipeline orchestrator
//!
//! detect → name → transform passes → resolve. The pipeline owns the
//! aggregate artifact set and the accumulated path mappings; plugins only
//! ever see snapshots.

mod detect;
mod transform;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::artifact::{Artifact, ArtifactSet, ConfigMergers, ServiceMap, roles};
use crate::config::PipelineConfig;
use crate::mapping::{ResolveReport, resolve};
use crate::naming::{GitProbe, RepoProbe, name_services};
use crate::plugin::{LabelSelector, PluginEnv, PluginRegistry};
use crate::{Error, Result};

pub use detect::{detect_services, walk_directories};
pub use transform::{TransformOutcome, run_passes};

/// Detected and named services of a source tree.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub project: String,
    pub source_root: PathBuf,
    pub services: ServiceMap,
}

impl Plan {
    /// One artifact per `(kind, service)`, hits of the same kind folded
    /// together.
    pub fn seed(&self, mergers: &ConfigMergers) -> Vec<Artifact> {
        let mut set = ArtifactSet::new();
        for hits in self.services.values() {
            set.merge(hits.clone(), mergers);
        }
        set.into_items()
    }
}

/// Summary of one named service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub directories: Vec<PathBuf>,
}

/// What a full [`Pipeline::run`] did.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub project: String,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub services: Vec<ServiceSummary>,
    pub passes: usize,
    pub truncated: bool,
    pub artifacts: usize,
    pub path_mappings: usize,
    pub resolution: ResolveReport,
}

impl PipelineReport {
    /// True when every mapping was applied.
    pub fn is_complete(&self) -> bool {
        self.resolution.is_clean()
    }
}

/// A configured pipeline over the plugins selected for its target.
pub struct Pipeline {
    plugins: PluginRegistry,
    mergers: ConfigMergers,
    config: PipelineConfig,
    probe: Box<dyn RepoProbe>,
}

impl Pipeline {
    /// Select the plugins of `registry` matching the configured target and
    /// selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Selector`] when the configured selector is invalid.
    pub fn new(registry: &PluginRegistry, config: PipelineConfig) -> Result<Self> {
        let selector = match &config.pipeline.selector {
            Some(expr) => LabelSelector::parse(expr)?,
            None => LabelSelector::everything(),
        };
        let plugins = registry.for_target(&config.pipeline.target).select(&selector);
        tracing::debug!(deploy_target = %config.pipeline.target, plugins = ?plugins.names(), "Selected plugins");

        Ok(Self {
            mergers: plugins.config_mergers(),
            plugins,
            config,
            probe: Box::new(GitProbe),
        })
    }

    /// Replace the repository probe used for naming.
    pub fn with_probe(mut self, probe: impl RepoProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Detect and name the services of `source_root`.
    pub fn plan(&self, source_root: &Path) -> Result<Plan> {
        let root = canonical_root(source_root)?;
        let dirs = walk_directories(&root, &self.config.detect)?;
        tracing::debug!(directories = dirs.len(), "Walked source tree");

        let detected = detect_services(&self.plugins, &dirs)?;
        let project = self.config.project_name(&root);
        let mut services = name_services(&project, detected, self.probe.as_ref());

        for (name, hits) in services.iter_mut() {
            for hit in hits {
                hit.name.clone_from(name);
            }
        }
        tracing::info!(project = %project, services = services.len(), "Named services");

        Ok(Plan {
            project,
            source_root: root,
            services,
        })
    }

    /// Run the transform passes over the seed artifacts of `plan`.
    pub fn transform(&self, plan: &Plan, scratch_dir: &Path) -> Result<TransformOutcome> {
        let env = PluginEnv::new(&plan.source_root, scratch_dir);
        run_passes(
            &self.plugins,
            &self.mergers,
            &env,
            plan.seed(&self.mergers),
            self.config.pipeline.max_passes,
        )
    }

    /// Transform `source_root` and write the result onto `output_root`.
    ///
    /// # Errors
    ///
    /// Fails when either root is unusable or a plugin violates its
    /// contract. Individual mapping failures are recorded in the report.
    pub fn run(&self, source_root: &Path, output_root: &Path) -> Result<PipelineReport> {
        let plan = self.plan(source_root)?;

        let scratch = tempfile::Builder::new().prefix("kubeshift-").tempdir()?;
        let outcome = self.transform(&plan, scratch.path())?;
        tracing::info!(
            passes = outcome.passes,
            mappings = outcome.path_mappings.len(),
            "Transform passes finished"
        );

        let resolution = resolve(&outcome.path_mappings, &plan.source_root, output_root)?;
        for error in &resolution.errors {
            tracing::warn!(error = %error, "Mapping not applied");
        }

        Ok(PipelineReport {
            services: summarize(&plan.services),
            project: plan.project,
            source_root: plan.source_root,
            output_root: output_root.to_path_buf(),
            passes: outcome.passes,
            truncated: outcome.truncated,
            artifacts: outcome.artifacts.len(),
            path_mappings: outcome.path_mappings.len(),
            resolution,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("plugins", &self.plugins)
            .field("mergers", &self.mergers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn canonical_root(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|source| Error::RootUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn summarize(services: &ServiceMap) -> Vec<ServiceSummary> {
    services
        .iter()
        .map(|(name, hits)| {
            let mut directories: Vec<PathBuf> = Vec::new();
            for dir in hits.iter().flat_map(|h| h.paths(roles::SERVICE_DIRECTORY)) {
                if !directories.contains(dir) {
                    directories.push(dir.clone());
                }
            }
            ServiceSummary {
                name: name.clone(),
                directories,
            }
        })
        .collect()
}

//! Core pipeline for kubeshift
//!
//! This crate turns a source tree into generated deployment artifacts:
//!
//! - **Artifacts**: named, typed units of work and the merge layer that
//!   folds plugin output into the aggregate set
//! - **Service naming**: detection hits to stable, metadata-safe names
//! - **Plugins**: the detect/transform contract, registry and label selectors
//! - **Path mappings**: deferred file operations and their ordered resolution
//! - **Pipeline**: detect, name, transform passes and resolution end to end
//!
//! # Architecture
//!
//! ```text
//!                  shift-cli
//!                      |
//!                 shift-core
//!                      |
//!            +---------+---------+
//!            |                   |
//!        shift-fs            shift-git
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shift_core::{Pipeline, PipelineConfig, PluginRegistry};
//!
//! let registry = PluginRegistry::with_builtins();
//! let pipeline = Pipeline::new(&registry, PipelineConfig::default())?;
//! let report = pipeline.run("./shop".as_ref(), "./out".as_ref())?;
//! println!("{} services", report.services.len());
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod mapping;
pub mod naming;
pub mod pipeline;
pub mod plugin;

pub use artifact::{Artifact, ArtifactSet, ConfigDecodeError, ConfigMergers, ServiceMap, merge_artifacts};
pub use config::{ConfigOverrides, ConfigResolver, PipelineConfig};
pub use error::{Error, Result};
pub use mapping::{PathMapping, PathMappingKind, ResolveReport, resolve};
pub use naming::{GitProbe, RepoProbe, name_services};
pub use pipeline::{Pipeline, PipelineReport, Plan};
pub use plugin::{LabelSelector, Plugin, PluginContract, PluginEnv, PluginRegistry, TransformOutput};

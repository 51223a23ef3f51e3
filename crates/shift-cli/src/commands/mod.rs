//! Command implementations

mod delta;
mod plan;
mod transform;

use std::path::Path;

use shift_core::{ConfigOverrides, ConfigResolver, PipelineConfig};

use crate::error::Result;

pub use delta::run_delta;
pub use plan::run_plan;
pub use transform::run_transform;

/// Where configuration comes from besides the source tree itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigSources<'a> {
    /// Override for the global config directory
    pub global_dir: Option<&'a Path>,
    /// Explicit `--config` file
    pub file: Option<&'a Path>,
}

/// Resolve the layered config for `source` and apply CLI overrides.
fn load_config(source: &Path, sources: ConfigSources<'_>, overrides: &ConfigOverrides) -> Result<PipelineConfig> {
    let mut resolver = ConfigResolver::new(source);
    if let Some(dir) = sources.global_dir {
        resolver = resolver.with_global_config_dir(dir);
    }
    if let Some(file) = sources.file {
        resolver = resolver.with_config_file(file);
    }

    let mut config = resolver.resolve()?;
    config.apply(overrides);
    Ok(config)
}

//! Copies service sources into the output tree

use std::path::{Path, PathBuf};

use crate::Result;
use crate::artifact::{Artifact, kinds, roles};
use crate::mapping::PathMapping;
use crate::plugin::{Plugin, PluginContract, PluginEnv, TransformOutput};

/// Output directory receiving the copied sources.
const SOURCE_DIR: &str = "source";

/// Emits a `Source` mapping for every service directory.
#[derive(Debug)]
pub struct SourceCopier {
    contract: PluginContract,
}

impl SourceCopier {
    pub fn new() -> Self {
        Self {
            contract: PluginContract::new().consumes(kinds::SERVICE),
        }
    }
}

impl Default for SourceCopier {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SourceCopier {
    fn name(&self) -> &str {
        "source-copier"
    }

    fn contract(&self) -> &PluginContract {
        &self.contract
    }

    fn transform(&self, env: &PluginEnv, new: &[Artifact], _old: &[Artifact]) -> Result<TransformOutput> {
        let mut output = TransformOutput::default();
        for artifact in new {
            for dir in artifact.paths(roles::SERVICE_DIRECTORY) {
                let Some(relative) = relative_to(dir, &env.source_root) else {
                    tracing::warn!(service = %artifact.name, path = %dir.display(), "Service directory outside source root");
                    continue;
                };
                output
                    .path_mappings
                    .push(PathMapping::source(&relative, Path::new(SOURCE_DIR).join(&relative)));
            }
        }
        Ok(output)
    }
}

fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    if path.is_relative() {
        return Some(path.to_path_buf());
    }
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PathMappingKind;

    #[test]
    fn maps_service_directories_under_source() {
        let env = PluginEnv::new("/src", "/tmp/scratch");
        let services = vec![
            Artifact::new(kinds::SERVICE, "api").with_path(roles::SERVICE_DIRECTORY, "/src/services/api"),
            Artifact::new(kinds::SERVICE, "ext").with_path(roles::SERVICE_DIRECTORY, "/elsewhere"),
        ];

        let output = SourceCopier::new().transform(&env, &services, &[]).unwrap();

        assert_eq!(output.path_mappings.len(), 1);
        let mapping = &output.path_mappings[0];
        assert_eq!(mapping.kind, PathMappingKind::Source);
        assert_eq!(mapping.source_path, PathBuf::from("services/api"));
        assert_eq!(mapping.destination_path, PathBuf::from("source/services/api"));
    }
}

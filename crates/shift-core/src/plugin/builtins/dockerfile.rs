//! Dockerfile detection

use std::fs;
use std::path::Path;

use super::{EXPOSE_CONFIG, Expose};
use crate::artifact::{Artifact, ServiceMap, kinds, roles};
use crate::naming::UNNAMED;
use crate::plugin::{Plugin, PluginContract};
use crate::Result;

const DOCKERFILE: &str = "Dockerfile";

/// Reports every directory containing a `Dockerfile` as an unnamed service.
#[derive(Debug)]
pub struct DockerfileDetector {
    contract: PluginContract,
}

impl DockerfileDetector {
    pub fn new() -> Self {
        Self {
            contract: PluginContract::new().produces(kinds::SERVICE),
        }
    }
}

impl Default for DockerfileDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DockerfileDetector {
    fn name(&self) -> &str {
        "dockerfile-detector"
    }

    fn contract(&self) -> &PluginContract {
        &self.contract
    }

    fn directory_detect(&self, dir: &Path) -> Result<ServiceMap> {
        let dockerfile = dir.join(DOCKERFILE);
        if !dockerfile.is_file() {
            return Ok(ServiceMap::new());
        }

        let content =
            fs::read_to_string(&dockerfile).map_err(|e| shift_fs::Error::io(&dockerfile, e))?;
        let mut hit = Artifact::new(kinds::SERVICE, UNNAMED)
            .with_path(roles::SERVICE_DIRECTORY, dir)
            .with_path(roles::DOCKERFILE, &dockerfile);
        if let Some(port) = exposed_port(&content) {
            hit.set_config(EXPOSE_CONFIG, &Expose { port })?;
        }

        tracing::debug!(path = %dockerfile.display(), "Detected Dockerfile");
        Ok(ServiceMap::from([(UNNAMED.to_string(), vec![hit])]))
    }
}

/// First port of the first `EXPOSE` instruction.
fn exposed_port(dockerfile: &str) -> Option<u16> {
    dockerfile
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (instruction, args) = line.split_once(char::is_whitespace)?;
            instruction.eq_ignore_ascii_case("EXPOSE").then_some(args)
        })
        .flat_map(str::split_whitespace)
        .find_map(|arg| arg.split('/').next()?.parse().ok())
}

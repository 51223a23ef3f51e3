//! Kubernetes Deployment generation

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{EXPOSE_CONFIG, Expose};
use crate::Result;
use crate::artifact::{Artifact, ConfigMergers, kinds, roles};
use crate::mapping::PathMapping;
use crate::plugin::{Plugin, PluginContract, PluginEnv, TARGET_LABEL, TransformOutput};

const DEPLOYMENT_TEMPLATE: &str = include_str!("deployment.yaml.tpl");
const TEMPLATE_FILE: &str = "deployment.yaml";
const YAMLS_DIR: &str = "deploy/yamls";
const DEFAULT_PORT: u16 = 8080;

/// Data bound to the deployment template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeploymentData {
    name: String,
    image: String,
    port: u16,
}

/// Renders one Deployment manifest per service.
#[derive(Debug)]
pub struct KubernetesManifests {
    contract: PluginContract,
}

impl KubernetesManifests {
    pub fn new() -> Self {
        Self {
            contract: PluginContract::new()
                .consumes_exclusively(kinds::SERVICE)
                .produces(kinds::KUBERNETES_YAMLS)
                .label(TARGET_LABEL, "kubernetes"),
        }
    }
}

impl Default for KubernetesManifests {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for KubernetesManifests {
    fn name(&self) -> &str {
        "kubernetes-manifests"
    }

    fn contract(&self) -> &PluginContract {
        &self.contract
    }

    fn transform(&self, env: &PluginEnv, new: &[Artifact], _old: &[Artifact]) -> Result<TransformOutput> {
        let mut output = TransformOutput::default();
        if new.is_empty() {
            return Ok(output);
        }

        let template = env.scratch_for(self.name())?.join(TEMPLATE_FILE);
        shift_fs::io::write_atomic(&template, DEPLOYMENT_TEMPLATE.as_bytes())?;

        for service in new {
            let port = service
                .config::<Expose>(EXPOSE_CONFIG)?
                .map_or(DEFAULT_PORT, |e| e.port);
            let data = DeploymentData {
                name: service.name.clone(),
                image: format!("{}:latest", service.name),
                port,
            };
            let destination = Path::new(YAMLS_DIR).join(format!("{}-deployment.yaml", service.name));

            output.path_mappings.push(PathMapping::template(
                &template,
                &destination,
                serde_json::to_value(&data)?,
            ));
            output.artifacts.push(
                Artifact::new(kinds::KUBERNETES_YAMLS, &service.name)
                    .with_path(roles::KUBERNETES_YAMLS, PathBuf::from(YAMLS_DIR)),
            );
        }

        Ok(output)
    }

    fn config_mergers(&self, mergers: &mut ConfigMergers) {
        mergers.register::<Expose>(EXPOSE_CONFIG);
    }
}

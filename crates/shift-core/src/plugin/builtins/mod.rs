//! Built-in reference plugins
//!
//! - `dockerfile-detector`: one service per directory holding a Dockerfile
//! - `source-copier`: copies every service directory into the output
//! - `kubernetes-manifests`: renders a Deployment per service

mod dockerfile;
mod kubernetes;
mod source;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Plugin;
use crate::artifact::Mergeable;

pub use dockerfile::DockerfileDetector;
pub use kubernetes::KubernetesManifests;
pub use source::SourceCopier;

/// Config kind carrying the port a service listens on.
pub const EXPOSE_CONFIG: &str = "Expose";

/// Port a service listens on, taken from `EXPOSE` or set by a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expose {
    pub port: u16,
}

impl Mergeable for Expose {
    fn merge(self, newer: Self) -> Self {
        if newer.port == 0 { self } else { newer }
    }
}

/// All built-in plugins in their default order.
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(DockerfileDetector::new()),
        Arc::new(SourceCopier::new()),
        Arc::new(KubernetesManifests::new()),
    ]
}

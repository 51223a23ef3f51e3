//! Artifacts: the pipeline's named, typed units of work
//!
//! Two artifacts describe the same logical unit iff their `(kind, name)`
//! match. Combining them unions their path lists and merges their configs
//! (see [`merge`]).

mod config;
mod merge;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use config::{ConfigMerger, ConfigMergers, Mergeable, TypedMerger, deep_merge, is_empty_value};
pub use merge::{ArtifactSet, merge_artifacts};

/// Well-known artifact kinds.
pub mod kinds {
    pub const SERVICE: &str = "Service";
    pub const DOCKERFILE: &str = "Dockerfile";
    pub const IR: &str = "IR";
    pub const KUBERNETES_YAMLS: &str = "KubernetesYamls";
}

/// Well-known path roles.
pub mod roles {
    pub const PROJECT_PATH: &str = "ProjectPath";
    pub const SERVICE_DIRECTORY: &str = "ServiceDirectory";
    pub const DOCKERFILE: &str = "Dockerfile";
    pub const KUBERNETES_YAMLS: &str = "KubernetesYamls";
}

/// Service name -> artifacts. The empty name holds hits not yet named.
pub type ServiceMap = BTreeMap<String, Vec<Artifact>>;

/// A named, typed unit of pipeline work and its result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Service or object this artifact concerns
    pub name: String,

    /// Artifact type, e.g. "Service" or "KubernetesYamls"
    pub kind: String,

    /// Path role -> ordered, duplicate-free path list
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, Vec<PathBuf>>,

    /// Config kind -> structured value, decoded on demand
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configs: BTreeMap<String, Value>,
}

/// A config value did not match the shape the caller asked for.
#[derive(Debug, thiserror::Error)]
#[error("Config '{kind}' of artifact '{artifact}' has an unexpected shape: {source}")]
pub struct ConfigDecodeError {
    pub kind: String,
    pub artifact: String,
    #[source]
    pub source: serde_json::Error,
}

impl Artifact {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Builder form of [`Artifact::add_path`].
    pub fn with_path(mut self, role: &str, path: impl Into<PathBuf>) -> Self {
        self.add_path(role, path);
        self
    }

    /// Attach an already-built config value under `kind`, replacing any
    /// previous one. Unlike [`Artifact::set_config`] nothing is serialized.
    pub fn with_config(mut self, kind: &str, value: Value) -> Self {
        self.configs.insert(kind.to_string(), value);
        self
    }

    /// Append `path` under `role` unless it is already listed.
    pub fn add_path(&mut self, role: &str, path: impl Into<PathBuf>) {
        let path = path.into();
        let list = self.paths.entry(role.to_string()).or_default();
        if !list.contains(&path) {
            list.push(path);
        }
    }

    /// Store a typed config value under `kind`.
    pub fn set_config<T: Serialize>(&mut self, kind: &str, value: &T) -> crate::Result<()> {
        self.configs
            .insert(kind.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Paths recorded under `role`, empty if none.
    pub fn paths(&self, role: &str) -> &[PathBuf] {
        self.paths.get(role).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every path across all roles, in role order.
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.values().flatten().map(PathBuf::as_path)
    }

    /// Identity used for merging.
    pub fn key(&self) -> (&str, &str) {
        (self.kind.as_str(), self.name.as_str())
    }

    pub fn same_unit(&self, other: &Artifact) -> bool {
        self.key() == other.key()
    }

    /// Decode the config stored under `kind`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigDecodeError`] when the stored value does not fit `T`.
    pub fn config<T: DeserializeOwned>(&self, kind: &str) -> Result<Option<T>, ConfigDecodeError> {
        self.configs
            .get(kind)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| ConfigDecodeError {
                    kind: kind.to_string(),
                    artifact: self.name.clone(),
                    source,
                })
            })
            .transpose()
    }

    /// Decode a config the caller cannot do without.
    ///
    /// # Errors
    ///
    /// [`crate::Error::MissingConfig`] when absent, which aborts the
    /// pipeline, or [`crate::Error::ConfigDecode`] on a shape mismatch.
    pub fn require_config<T: DeserializeOwned>(&self, kind: &str) -> crate::Result<T> {
        self.config(kind)?.ok_or_else(|| crate::Error::MissingConfig {
            kind: kind.to_string(),
            artifact: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Expose {
        port: u16,
    }

    #[test]
    fn add_path_deduplicates_and_keeps_order() {
        let artifact = Artifact::new(kinds::SERVICE, "api")
            .with_path(roles::SERVICE_DIRECTORY, "/src/b")
            .with_path(roles::SERVICE_DIRECTORY, "/src/a")
            .with_path(roles::SERVICE_DIRECTORY, "/src/b");

        assert_eq!(
            artifact.paths(roles::SERVICE_DIRECTORY),
            &[PathBuf::from("/src/b"), PathBuf::from("/src/a")]
        );
        assert!(artifact.paths(roles::DOCKERFILE).is_empty());
    }

    #[test]
    fn config_decodes_into_target_shape() {
        let artifact = Artifact::new(kinds::SERVICE, "api").with_config("Expose", json!({"port": 80}));
        let expose: Option<Expose> = artifact.config("Expose").unwrap();
        assert_eq!(expose, Some(Expose { port: 80 }));
        assert_eq!(artifact.config::<Expose>("Other").unwrap(), None);
    }

    #[test]
    fn with_config_stores_value_verbatim_and_replaces() {
        let mut artifact = Artifact::new(kinds::SERVICE, "api")
            .with_config("Expose", json!({"port": 80}))
            .with_config("Expose", json!("not an object"));
        assert_eq!(artifact.configs["Expose"], json!("not an object"));

        artifact.set_config("Expose", &json!({"port": 81})).unwrap();
        assert_eq!(artifact.config::<Expose>("Expose").unwrap(), Some(Expose { port: 81 }));
    }

    #[test]
    fn config_shape_mismatch_is_typed_error() {
        let artifact =
            Artifact::new(kinds::SERVICE, "api").with_config("Expose", json!({"port": "eighty"}));
        let err = artifact.config::<Expose>("Expose").unwrap_err();
        assert_eq!(err.kind, "Expose");
        assert_eq!(err.artifact, "api");
    }

    #[test]
    fn require_config_reports_missing_kind() {
        let artifact = Artifact::new(kinds::SERVICE, "api");
        let err = artifact.require_config::<Expose>("Expose").unwrap_err();
        assert!(matches!(err, crate::Error::MissingConfig { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn same_unit_compares_kind_and_name() {
        let a = Artifact::new(kinds::SERVICE, "api");
        assert!(a.same_unit(&Artifact::new(kinds::SERVICE, "api").with_path("x", "/y")));
        assert!(!a.same_unit(&Artifact::new(kinds::DOCKERFILE, "api")));
        assert!(!a.same_unit(&Artifact::new(kinds::SERVICE, "web")));
    }
}

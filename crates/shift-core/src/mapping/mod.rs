//! Path mappings: deferred, declarative file operations
//!
//! Plugins return mappings instead of touching the output tree. The
//! [`resolve`] step applies the accumulated list once the pipeline settles.

mod resolver;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use resolver::{ResolveReport, resolve};

/// The closed set of mapping operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathMappingKind {
    /// Merge a generated file or tree into the output
    Default,
    /// Render the source through the template engine
    Template,
    /// Bulk copy of project sources, applied before everything else
    Source,
    /// Like `Source` but ordered with the other mappings and never deduplicated
    ModifiedSource,
    /// Remove the destination, applied after everything else
    Delete,
}

impl fmt::Display for PathMappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Default => "Default",
            Self::Template => "Template",
            Self::Source => "Source",
            Self::ModifiedSource => "ModifiedSource",
            Self::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// A deferred file operation.
///
/// Relative source paths resolve against the source root, relative
/// destination paths against the output root. Absolute paths are used as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMapping {
    pub kind: PathMappingKind,

    #[serde(default)]
    pub source_path: PathBuf,

    #[serde(default)]
    pub destination_path: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_data: Option<Value>,
}

impl PathMapping {
    fn new(kind: PathMappingKind, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            source_path: source.into(),
            destination_path: destination.into(),
            template_data: None,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn default(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::new(PathMappingKind::Default, source, destination)
    }

    pub fn source(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::new(PathMappingKind::Source, source, destination)
    }

    pub fn modified_source(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::new(PathMappingKind::ModifiedSource, source, destination)
    }

    pub fn template(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, data: Value) -> Self {
        Self {
            template_data: Some(data),
            ..Self::new(PathMappingKind::Template, source, destination)
        }
    }

    pub fn delete(destination: impl Into<PathBuf>) -> Self {
        Self::new(PathMappingKind::Delete, PathBuf::new(), destination)
    }
}

impl fmt::Display for PathMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PathMappingKind::Delete => write!(f, "Delete {}", self.destination_path.display()),
            kind => write!(
                f,
                "{kind} {} -> {}",
                self.source_path.display(),
                self.destination_path.display()
            ),
        }
    }
}

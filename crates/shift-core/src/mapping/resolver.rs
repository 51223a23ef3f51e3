//! Path Mapping Resolver
//!
//! Applies mappings in three fixed phases:
//!
//! 1. `Source` mappings, first occurrence of each `(source, destination)`
//! 2. everything else in caller order, `Default` deduplicated like `Source`
//! 3. `Delete` mappings
//!
//! A failing mapping is logged and recorded in the report; the rest still
//! run. Only an unusable source or output root aborts resolution.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use super::{PathMapping, PathMappingKind};
use crate::{Error, Result};
use shift_fs::path::resolve_under;

/// Outcome of a [`resolve`] run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveReport {
    /// Mappings that were applied, in application order
    pub applied: Vec<String>,
    /// Duplicate mappings that were skipped
    pub skipped: usize,
    /// Mappings that failed, with the reason
    pub errors: Vec<String>,
}

impl ResolveReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Apply `mappings` onto `output_root`.
///
/// # Errors
///
/// [`Error::RootUnavailable`] when `source_root` cannot be read or
/// `output_root` cannot be created. Per-mapping failures are reported in
/// [`ResolveReport::errors`] instead.
pub fn resolve(mappings: &[PathMapping], source_root: &Path, output_root: &Path) -> Result<ResolveReport> {
    fs::metadata(source_root).map_err(|source| Error::RootUnavailable {
        path: source_root.to_path_buf(),
        source,
    })?;
    fs::create_dir_all(output_root).map_err(|source| Error::RootUnavailable {
        path: output_root.to_path_buf(),
        source,
    })?;

    let mut resolver = Resolver {
        source_root,
        output_root,
        report: ResolveReport::default(),
    };

    let mut seen_source = HashSet::new();
    for mapping in mappings.iter().filter(|m| m.kind == PathMappingKind::Source) {
        if !seen_source.insert((&mapping.source_path, &mapping.destination_path)) {
            resolver.report.skipped += 1;
            continue;
        }
        resolver.apply(mapping);
    }

    let mut seen_default = HashSet::new();
    for mapping in mappings {
        match mapping.kind {
            PathMappingKind::Source | PathMappingKind::Delete => {}
            PathMappingKind::Default => {
                if !seen_default.insert((&mapping.source_path, &mapping.destination_path)) {
                    resolver.report.skipped += 1;
                    continue;
                }
                resolver.apply(mapping);
            }
            PathMappingKind::ModifiedSource | PathMappingKind::Template => resolver.apply(mapping),
        }
    }

    for mapping in mappings.iter().filter(|m| m.kind == PathMappingKind::Delete) {
        resolver.apply(mapping);
    }

    Ok(resolver.report)
}

struct Resolver<'a> {
    source_root: &'a Path,
    output_root: &'a Path,
    report: ResolveReport,
}

impl Resolver<'_> {
    fn apply(&mut self, mapping: &PathMapping) {
        match self.try_apply(mapping) {
            Ok(()) => self.report.applied.push(mapping.to_string()),
            Err(e) => {
                tracing::error!(mapping = %mapping, error = %e, "Failed to apply path mapping");
                self.report.errors.push(format!("{mapping}: {e}"));
            }
        }
    }

    fn try_apply(&self, mapping: &PathMapping) -> Result<()> {
        let destination = self.destination(&mapping.destination_path)?;

        match mapping.kind {
            PathMappingKind::Delete => {
                tracing::debug!(path = %destination.display(), "Deleting");
                shift_fs::io::remove_any(&destination)?;
            }
            PathMappingKind::Template => {
                let source = resolve_under(self.source_root, &mapping.source_path);
                let data = mapping.template_data.as_ref().unwrap_or(&Value::Null);
                shift_fs::template_copy(&source, &destination, data)?;
            }
            PathMappingKind::Default | PathMappingKind::Source | PathMappingKind::ModifiedSource => {
                let source = resolve_under(self.source_root, &mapping.source_path);
                shift_fs::merge(&source, &destination)?;
            }
        }
        Ok(())
    }

    fn destination(&self, path: &Path) -> Result<PathBuf> {
        if path.is_relative() && path.components().any(|c| c == Component::ParentDir) {
            return Err(Error::EscapesRoot {
                path: path.to_path_buf(),
            });
        }
        Ok(resolve_under(self.output_root, path))
    }
}

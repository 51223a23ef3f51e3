//! Source tree walk for the detect phase

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

use crate::artifact::ServiceMap;
use crate::config::DetectConfig;
use crate::plugin::PluginRegistry;
use crate::{Error, Result};

/// Directories under `root` that detection visits, in walk order.
///
/// Hidden entries, VCS metadata, `.gitignore`d paths, the configured
/// patterns and per-directory ignore files are skipped.
pub fn walk_directories(root: &Path, config: &DetectConfig) -> Result<Vec<PathBuf>> {
    fs::metadata(root).map_err(|source| Error::RootUnavailable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut overrides = OverrideBuilder::new(root);
    for pattern in &config.ignore {
        overrides.add(&format!("!{pattern}"))?;
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .overrides(overrides.build()?)
        .sort_by_file_name(|a, b| a.cmp(b));
    if !config.ignore_file.is_empty() {
        builder.add_custom_ignore_filename(&config.ignore_file);
    }

    let mut dirs = Vec::new();
    for entry in builder.build() {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|t| t.is_dir()) => dirs.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable entry during detection"),
        }
    }
    Ok(dirs)
}

/// Run every plugin's directory detection over `dirs` and union the hits
/// per service name.
///
/// A failing `(plugin, directory)` pair is logged and skipped unless the
/// error is fatal.
pub fn detect_services(plugins: &PluginRegistry, dirs: &[PathBuf]) -> Result<ServiceMap> {
    let mut services = ServiceMap::new();
    for dir in dirs {
        for plugin in plugins.iter() {
            match plugin.directory_detect(dir) {
                Ok(found) => {
                    for (name, hits) in found {
                        services.entry(name).or_default().extend(hits);
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(plugin = plugin.name(), path = %dir.display(), error = %e, "Detection failed");
                }
            }
        }
    }
    Ok(services)
}

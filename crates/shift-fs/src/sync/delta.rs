//! Change-set capture instead of mutation
//!
//! Layout written under the store directory:
//!
//! ```text
//! <store>/additions/<relpath>      entries only in source, recursively mirrored
//! <store>/modifications/<relpath>  changed regular files, source mtime kept
//! <store>/deletions.txt            one relpath per line, destination-only or
//!                                  replaced by an entry of another type
//! ```

use std::path::{Path, PathBuf};

use super::engine::{SyncStrategy, Visit, already_synchronized, sync_tree};
use super::replicate::replicate;
use crate::path::to_slash;
use crate::{Result, io};

pub const ADDITIONS_DIR: &str = "additions";
pub const MODIFICATIONS_DIR: &str = "modifications";
pub const DELETIONS_FILE: &str = "deletions.txt";

/// Strategy that records the difference from destination to source.
#[derive(Debug)]
pub struct GenerateDelta {
    source_root: PathBuf,
    destination_root: PathBuf,
    store: PathBuf,
}

impl GenerateDelta {
    pub fn new(source_root: &Path, destination_root: &Path, store: &Path) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            destination_root: destination_root.to_path_buf(),
            store: store.to_path_buf(),
        }
    }

    fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
        path.strip_prefix(root).unwrap_or(path)
    }

    fn addition_path(&self, src: &Path) -> PathBuf {
        self.store
            .join(ADDITIONS_DIR)
            .join(Self::relative(src, &self.source_root))
    }

    fn record_addition(&self, src: &Path) -> Result<()> {
        let target = self.addition_path(src);
        tracing::debug!(path = %src.display(), "Recording addition");
        if src.is_dir() {
            replicate(src, &target)
        } else {
            io::copy_file(src, &target)
        }
    }

    fn record_deletion(&self, dst: &Path) -> Result<()> {
        let rel = to_slash(Self::relative(dst, &self.destination_root));
        tracing::debug!(path = %rel, "Recording deletion");
        io::append_line(&self.store.join(DELETIONS_FILE), &rel)
    }
}

impl SyncStrategy for GenerateDelta {
    fn on_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if !dst.exists() {
            return self.record_addition(src);
        }
        if already_synchronized(src, dst) {
            return Ok(());
        }
        let target = self
            .store
            .join(MODIFICATIONS_DIR)
            .join(Self::relative(src, &self.source_root));
        tracing::debug!(path = %src.display(), "Recording modification");
        io::copy_file(src, &target)
    }

    fn on_addition(&mut self, src: &Path, _dst: &Path) -> Result<Visit> {
        self.record_addition(src)?;
        Ok(Visit::Prune)
    }

    fn on_deletion(&mut self, _src: &Path, dst: &Path) -> Result<()> {
        self.record_deletion(dst)
    }

    fn on_mismatch(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        // A type change replaces the destination entry: it is removed and
        // the source entry is added in its place.
        self.record_deletion(dst)?;
        self.record_addition(src)?;
        Ok(Visit::Prune)
    }

    fn on_symlink(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if let (Ok(a), Ok(b)) = (std::fs::read_link(src), std::fs::read_link(dst))
            && a == b
        {
            return Ok(());
        }
        if std::fs::symlink_metadata(dst).is_ok() {
            self.record_deletion(dst)?;
        }
        tracing::debug!(path = %src.display(), "Recording link");
        io::copy_symlink(src, &self.addition_path(src))
    }
}

/// Capture how `source` differs from `destination` under `store`, without
/// touching `destination`.
pub fn generate_delta(source: &Path, destination: &Path, store: &Path) -> Result<()> {
    sync_tree(
        source,
        destination,
        &mut GenerateDelta::new(source, destination, store),
    )
}

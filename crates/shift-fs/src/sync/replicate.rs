//! Full mirror: the destination ends up identical to the source

use std::path::Path;

use super::engine::{SyncStrategy, Visit, already_synchronized, sync_tree};
use crate::{Result, io};

/// Strategy that mirrors source onto destination, removing extra entries.
#[derive(Debug, Default)]
pub struct Replicate;

impl SyncStrategy for Replicate {
    fn on_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if already_synchronized(src, dst) {
            return Ok(());
        }
        tracing::debug!(src = %src.display(), dst = %dst.display(), "Replicating file");
        io::copy_file(src, dst)
    }

    fn on_addition(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        io::create_dir_like(src, dst)?;
        Ok(Visit::Descend)
    }

    fn on_deletion(&mut self, _src: &Path, dst: &Path) -> Result<()> {
        tracing::debug!(path = %dst.display(), "Removing entry absent from source");
        io::remove_any(dst)
    }

    fn on_mismatch(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        io::remove_any(dst)?;
        if src.is_dir() {
            io::create_dir_like(src, dst)?;
        }
        Ok(Visit::Descend)
    }
}

/// Mirror `source` onto `destination`.
///
/// Files present only in `destination` are removed; changed files are
/// copied with their permissions and modification times.
pub fn replicate(source: &Path, destination: &Path) -> Result<()> {
    sync_tree(source, destination, &mut Replicate)
}

//! Merge that renders every file through the template engine

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::engine::{SyncStrategy, Visit, already_synchronized, sync_tree};
use super::merge::{link_without_clobbering, type_conflict};
use crate::{Error, Result, io, template};

/// Strategy that merges source onto destination, rendering each file with
/// the bound data on the way.
#[derive(Debug)]
pub struct TemplateCopy {
    data: Value,
}

impl TemplateCopy {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}

impl SyncStrategy for TemplateCopy {
    fn on_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if already_synchronized(src, dst) {
            return Ok(());
        }
        let text = fs::read_to_string(src).map_err(|e| Error::io(src, e))?;
        let rendered =
            template::render_value(&text, &self.data).map_err(|e| Error::template(src, e))?;
        tracing::debug!(src = %src.display(), dst = %dst.display(), "Rendering template");
        io::write_atomic(dst, rendered.as_bytes())?;
        let perms = fs::metadata(src).map_err(|e| Error::io(src, e))?.permissions();
        fs::set_permissions(dst, perms).map_err(|e| Error::io(dst, e))
    }

    fn on_addition(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        io::create_dir_like(src, dst)?;
        Ok(Visit::Descend)
    }

    fn on_deletion(&mut self, _src: &Path, _dst: &Path) -> Result<()> {
        Ok(())
    }

    fn on_mismatch(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        type_conflict(src, dst)
    }

    fn on_symlink(&mut self, src: &Path, dst: &Path) -> Result<()> {
        link_without_clobbering(src, dst)
    }
}

/// Render every file under `source` with `data` and merge the results onto
/// `destination`. `source` may be a single file.
pub fn template_copy<T: Serialize + ?Sized>(source: &Path, destination: &Path, data: &T) -> Result<()> {
    let value = serde_json::to_value(data)?;
    sync_tree(source, destination, &mut TemplateCopy::new(value))
}

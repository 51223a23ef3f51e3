//! Delta command implementation

use std::path::Path;

use colored::Colorize;
use shift_fs::sync::{ADDITIONS_DIR, DELETIONS_FILE, MODIFICATIONS_DIR};

use crate::error::{CliError, Result};

/// Write the change set turning `destination` into `source` under `store`.
pub fn run_delta(source: &Path, destination: &Path, store: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(CliError::user(format!(
            "Source directory not found: {}",
            source.display()
        )));
    }

    shift_fs::generate_delta(source, destination, store)?;

    println!("{} {}", "Delta written to".green().bold(), store.display());
    for part in [ADDITIONS_DIR, MODIFICATIONS_DIR, DELETIONS_FILE] {
        let marker = if store.join(part).exists() { "+".green() } else { "-".dimmed() };
        println!("  {marker} {part}");
    }
    Ok(())
}

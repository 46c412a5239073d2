//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::Path;

use crate::utils::config::TEXT_FILE_SUFFIX;

/// True if the file name ends with `.txt` (case-sensitive). Only the name is checked, not the file type.
pub fn has_text_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with(TEXT_FILE_SUFFIX))
}

/// Returns true if a walked entry should be queued: a regular file with a `.txt` name.
pub fn should_queue(path: &Path, is_file: bool) -> bool {
    is_file && has_text_suffix(path)
}

/// Check that the root is a readable directory (CLI startup warning). The pipeline itself only
/// reports this as a walk error and retries on the next pass.
pub fn check_root(path: &Path) -> Result<()> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("cannot access scan root {}", path.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("scan root {} is not a directory", path.display());
    }
    Ok(())
}

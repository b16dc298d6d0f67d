//! Writing the mirrored tree and the project files to disk.

use crate::error::{MirrorError, Result};
use crate::project::Project;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Write `data` to `relative` under `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, data: &[u8]) -> Result<PathBuf> {
    let path = root.join(relative);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))?;
        }
    }

    fs::write(&path, data).map_err(|e| MirrorError::io(&path, e))?;
    debug!(path = %path.display(), bytes = data.len(), "wrote file");

    Ok(path)
}

/// Write `<name>.hhp`, `<name>.hhc` and `<name>.hhk` into `root`.
pub fn save_project(project: &Project, root: &Path) -> Result<Vec<PathBuf>> {
    let index = project.render_index()?;
    let outputs = [
        (project.manifest_filename(), project.render_manifest()),
        (project.outline_filename(), project.render_outline()),
        (project.index_filename(), index),
    ];

    outputs
        .iter()
        .map(|(name, text)| write_file(root, name, text.as_bytes()))
        .collect()
}

/// Copy the extra stylesheet into `root` unless an identical-size copy is
/// already there. Returns whether a copy was made.
///
/// A missing source is logged and skipped.
pub fn install_stylesheet(source: &Path, root: &Path) -> Result<bool> {
    if !source.is_file() {
        warn!(path = %source.display(), "stylesheet not found, pages will use the site styles only");
        return Ok(false);
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| MirrorError::Config(format!("not a file: {}", source.display())))?;
    let dest = root.join(file_name);

    if dest.exists() && file_size(&dest)? == file_size(source)? {
        return Ok(false);
    }

    fs::copy(source, &dest).map_err(|e| MirrorError::io(&dest, e))?;
    Ok(true)
}

/// Get the size of a file in bytes.
pub fn file_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| MirrorError::io(path, e))?;
    Ok(metadata.len())
}

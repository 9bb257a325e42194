//! Path normalization and file relocation.
//!
//! - `normalize_path` - absolute form without touching the file system
//! - `resolve_inputs` - absolute, existing regular files or a hard error
//! - `is_same_file` - whether two paths name the same file
//! - `move_file` - rename, falling back to copy across file systems

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::debug;

/// File system errors of the path utilities.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("IO error at `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),
}

/// Normalize a file system path to absolute form.
///
/// Unlike `canonicalize()`, symlinks are kept, so an absolute path comes
/// back unchanged. Falls back to joining with the current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    })
}

/// Resolve input images to absolute paths of existing regular files.
///
/// Fails on the first path that is missing (or not a regular file); paths
/// are never skipped.
pub fn resolve_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, PathError> {
    paths
        .iter()
        .map(|path| {
            let resolved = normalize_path(path);
            if resolved.is_file() {
                Ok(resolved)
            } else {
                Err(PathError::NotFound(resolved))
            }
        })
        .collect()
}

/// Move `from` to `to`, replacing `to` if it exists.
pub fn move_file(from: &Path, to: &Path) -> Result<(), PathError> {
    match fs::rename(from, to) {
        Ok(()) => {}
        // Scratch space often lives on another mount (e.g. tmpfs).
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).map_err(|e| PathError::Io(to.to_path_buf(), e))?;
            fs::remove_file(from).map_err(|e| PathError::Io(from.to_path_buf(), e))?;
        }
        Err(e) => return Err(PathError::Io(from.to_path_buf(), e)),
    }

    debug!("mv"; "{} {}", from.display(), to.display());
    Ok(())
}

/// Whether `a` and `b` name the same file, following symlinks.
///
/// Paths that cannot be resolved are only equal when spelled the same.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

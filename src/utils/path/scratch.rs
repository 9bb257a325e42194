//! Scratch directory for intermediate converter output.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::debug;

use super::{PathError, normalize_path};

/// A directory that exists for the duration of a batch.
///
/// The engine never deletes it. `is_generated` tells the caller whether the
/// directory was created on its behalf (and is therefore safe to remove).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    path: PathBuf,
    generated: bool,
}

impl ScratchDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Location inside the scratch directory for a file name.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory and everything in it.
    pub fn remove(&self) -> Result<(), PathError> {
        fs::remove_dir_all(&self.path).map_err(|e| PathError::Io(self.path.clone(), e))
    }
}

/// Make sure a scratch directory exists and return its absolute path.
///
/// With `Some(dir)` the directory (and any missing parents) is created if
/// needed; existing contents are left alone. With `None` a unique directory
/// is generated under the system temp dir.
pub fn prepare_scratch(dir: Option<&Path>) -> Result<ScratchDir, PathError> {
    let Some(dir) = dir else {
        let temp = tempfile::Builder::new()
            .prefix("makemovie-")
            .tempdir()
            .map_err(|e| PathError::Io(std::env::temp_dir(), e))?;
        let path = temp.keep();
        debug!("mkdir"; "{}", path.display());
        return Ok(ScratchDir {
            path,
            generated: true,
        });
    };

    let path = normalize_path(dir);
    if !path.is_dir() {
        fs::create_dir_all(&path).map_err(|e| PathError::Io(path.clone(), e))?;
        debug!("mkdir"; "{}", path.display());
    }

    Ok(ScratchDir {
        path,
        generated: false,
    })
}

//! Where a transformed image ends up.

use std::path::{Path, PathBuf};

/// Final location of each output relative to its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Destination {
    /// Replace the input file.
    #[default]
    Overwrite,
    /// Write next to the input, with a suffix before the extension.
    Append(String),
}

impl Destination {
    /// Build from an optional suffix; an empty suffix means overwrite.
    pub fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some(s) if !s.is_empty() => Self::Append(s.to_string()),
            _ => Self::Overwrite,
        }
    }

    /// Destination path for `input`.
    ///
    /// `a.png` with suffix `_trimmed` becomes `a_trimmed.png`; a file without
    /// extension simply gets the suffix.
    pub fn for_input(&self, input: &Path) -> PathBuf {
        let Self::Append(suffix) = self else {
            return input.to_path_buf();
        };

        let mut name = input.file_stem().unwrap_or_default().to_os_string();
        name.push(suffix);
        if let Some(ext) = input.extension() {
            name.push(".");
            name.push(ext);
        }
        input.with_file_name(name)
    }
}

/// Path with the extension replaced, e.g. `logo.svg` -> `logo.png`.
pub fn with_extension(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension.trim_start_matches('.'))
}

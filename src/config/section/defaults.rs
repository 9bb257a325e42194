//! `[defaults]` section configuration.
//!
//! Default options for every operation, overridden by CLI flags.
//!
//! # Example
//!
//! ```toml
//! [defaults]
//! background = "white"    # none | any color (trim: white, rasterize: none)
//! flatten = false         # add -flatten to trim/background
//! append = "_trimmed"     # write a_trimmed.png instead of overwriting a.png
//! temp_dir = ".scratch"   # relative to this file (default: unique temp dir)
//! extension = "png"       # rasterize output format
//! ```

use serde::Deserialize;
use std::path::PathBuf;

use crate::batch::Background;
use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Background color; `None` lets each command pick its own default.
    pub background: Option<Background>,

    /// Flatten layers after applying the background.
    pub flatten: bool,

    /// Suffix inserted before the extension; unset overwrites the input.
    pub append: Option<String>,

    /// Scratch directory for intermediate files.
    pub temp_dir: Option<PathBuf>,

    /// Output extension of rasterized SVGs.
    pub extension: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            background: None,
            flatten: false,
            append: None,
            temp_dir: None,
            extension: "png".to_string(),
        }
    }
}

impl DefaultsConfig {
    /// Validate default options.
    ///
    /// # Checks
    /// - `extension` names a format (non-empty, no path separator).
    /// - `append` contains no path separator.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            diag.error_with_hint(
                "defaults.extension",
                "extension is empty",
                "use a raster format such as \"png\"",
            );
        } else if extension.contains(['/', '\\']) {
            diag.error("defaults.extension", "extension must not contain a path separator");
        }

        if let Some(ref suffix) = self.append
            && suffix.contains(['/', '\\'])
        {
            diag.error_with_hint(
                "defaults.append",
                "suffix must not contain a path separator",
                "outputs are always written next to their input",
            );
        }
    }
}

//! `[tools]` section configuration.
//!
//! Commands used to invoke the external image tools.
//!
//! # Example
//!
//! ```toml
//! [tools]
//! convert = ["magick", "convert"]  # default: ["convert"]
//! rsvg = ["rsvg-convert"]          # default: ["rsvg-convert"]
//! ```
//!
//! The first word of each command is the binary probed on `PATH`.

use serde::Deserialize;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Raster converter (ImageMagick).
    pub convert: Vec<String>,

    /// SVG rasterizer (librsvg).
    pub rsvg: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            convert: vec!["convert".to_string()],
            rsvg: vec!["rsvg-convert".to_string()],
        }
    }
}

impl ToolsConfig {
    /// Validate tool commands.
    ///
    /// # Checks
    /// - Every command has a non-empty program name.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        Self::validate_command("tools.convert", &self.convert, "[\"convert\"]", diag);
        Self::validate_command("tools.rsvg", &self.rsvg, "[\"rsvg-convert\"]", diag);
    }

    fn validate_command(
        field: &'static str,
        command: &[String],
        example: &str,
        diag: &mut ConfigDiagnostics,
    ) {
        match command.first() {
            None => diag.error_with_hint(
                field,
                "command is empty",
                format!("set {field} = {example} or remove the field"),
            ),
            Some(program) if program.trim().is_empty() => {
                diag.error(field, "program name is blank");
            }
            Some(_) => {}
        }
    }
}

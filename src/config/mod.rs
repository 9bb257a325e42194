//! Configuration management for `makemovie.toml`.
//!
//! The file is optional: without one every value comes from the built-in
//! defaults. Precedence is CLI flag > config file > default.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── defaults   # [defaults]
//! │   └── tools      # [tools]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigDiagnostics
//! ├── util.rs        # find_config_file
//! └── mod.rs         # Config (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `[tools]`    | Commands used for `convert` and `rsvg-convert`    |
//! | `[defaults]` | Background, flatten, append suffix, scratch, ext  |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{DefaultsConfig, ToolsConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    batch::Background,
    cli::{Cli, Commands, OutputArgs},
    log,
};
use anyhow::{Result, bail};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "makemovie.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing makemovie.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, if one was loaded
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// External tool commands
    pub tools: ToolsConfig,

    /// Default operation options
    pub defaults: DefaultsConfig,
}

impl Config {
    /// Load configuration for a CLI invocation.
    ///
    /// An explicit `--config` must exist; the default file name is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match Self::resolve_config_path(cli)? {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(crate::utils::path::normalize_path(&path));
                config
            }
            None => Self::default(),
        };

        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Locate the config file for this invocation.
    fn resolve_config_path(cli: &Cli) -> Result<Option<PathBuf>> {
        match &cli.config {
            Some(name) => match find_config_file(name) {
                Some(path) => Ok(Some(path)),
                None => bail!(ConfigError::Validation(format!(
                    "config file `{}` not found",
                    name.display()
                ))),
            },
            None => Ok(find_config_file(Path::new(CONFIG_FILE))),
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {}, ignoring:", path.display());
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Directory relative paths in the config file are resolved against.
    pub fn root(&self) -> PathBuf {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self.root();
        if let Some(dir) = self.defaults.temp_dir.take() {
            self.defaults.temp_dir = Some(crate::utils::path::normalize_path(&root.join(dir)));
        }

        self.apply_command_options(cli);
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Trim {
                output,
                background,
                flatten,
                ..
            } => {
                self.apply_output_args(output);
                self.apply_background(background.as_ref());
                Self::update_option(&mut self.defaults.flatten, flatten.as_ref());
            }
            Commands::Flatten { output, .. } => {
                self.apply_output_args(output);
            }
            Commands::Background {
                output, flatten, ..
            } => {
                self.apply_output_args(output);
                Self::update_option(&mut self.defaults.flatten, flatten.as_ref());
            }
            Commands::Rasterize {
                background, ext, ..
            } => {
                self.apply_background(background.as_ref());
                Self::update_option(&mut self.defaults.extension, ext.as_ref());
            }
        }
    }

    /// Apply output arguments shared by the converter commands.
    ///
    /// CLI paths stay relative to the working directory.
    fn apply_output_args(&mut self, args: &OutputArgs) {
        if let Some(ref suffix) = args.append {
            self.defaults.append = Some(suffix.clone());
        }
        if let Some(ref dir) = args.temp_dir {
            self.defaults.temp_dir = Some(crate::utils::path::normalize_path(dir));
        }
    }

    fn apply_background(&mut self, background: Option<&Background>) {
        if let Some(background) = background {
            self.defaults.background = Some(background.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.tools.validate(&mut diag);
        self.defaults.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a config snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

//! External tool discovery.
//!
//! Every batch operation probes its tool first, so a missing binary is
//! reported before any directory is created or file is touched.

use std::{ffi::OsStr, path::PathBuf};

use thiserror::Error;

use crate::utils::exec::{Cmd, Runner};

/// A required program is not installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{program}` not found on PATH, {hint}")]
pub struct MissingTool {
    pub program: String,
    pub hint: &'static str,
}

/// Result of looking a program up on the execution path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAvailability {
    Found(PathBuf),
    Missing,
}

/// A configured tool invocation, e.g. `["convert"]` or `["magick", "convert"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand<'a> {
    command: &'a [String],
    hint: &'static str,
}

impl<'a> ToolCommand<'a> {
    pub const fn new(command: &'a [String], hint: &'static str) -> Self {
        Self { command, hint }
    }

    /// The binary that must exist (first word of the command).
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    /// Check that the program is installed.
    pub fn probe(&self, runner: &dyn Runner) -> Result<PathBuf, MissingTool> {
        let program = self.program();
        let missing = || MissingTool {
            program: program.to_string(),
            hint: self.hint,
        };

        if program.is_empty() {
            return Err(missing());
        }
        match runner.locate(OsStr::new(program)) {
            ToolAvailability::Found(path) => Ok(path),
            ToolAvailability::Missing => Err(missing()),
        }
    }

    /// Start a command line for this tool.
    pub fn cmd(&self) -> Cmd {
        Cmd::from_slice(self.command)
    }
}

//! External command execution utilities.
//!
//! Provides a Builder-based API for describing a command, a [`Runner`] seam
//! that executes it, and output filtering for noisy tools.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::{Cmd, Runner, SystemRunner};
//!
//! let cmd = Cmd::from_slice(&["convert"])
//!     .args(["-trim", "-verbose"])
//!     .arg(input)
//!     .arg(scratch.join("tmp.png"));
//!
//! // Merged stdout + stderr, as text
//! let report = SystemRunner.run(&cmd)?;
//! ```

use crate::debug;
use crate::utils::tool::ToolAvailability;
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    fmt,
    io::Read,
    process::{Command, Stdio},
    sync::OnceLock,
};
use thiserror::Error;

/// Why a command produced no usable output.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to execute `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed with {status}\n{output}")]
    Process {
        command: String,
        status: String,
        output: String,
    },
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["convert"]` or `["magick", "convert"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program: &OsStr = iter.next().map_or(OsStr::new(""), |s| s.as_ref());
        Self::new(program).args(iter)
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }
}

/// Shell-style rendering, used for echoing and error messages.
impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> std::borrow::Cow<'_, str> {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.,/:=+%@#".contains(c));
    if plain {
        s.into()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")).into()
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Executes commands on behalf of the batch engine.
pub trait Runner {
    /// Run to completion, returning merged stdout and stderr as text.
    ///
    /// A non-zero exit status is an error carrying the captured output.
    fn run(&self, cmd: &Cmd) -> Result<String, ExecError>;

    /// Look up a program on the execution path.
    fn locate(&self, program: &OsStr) -> ToolAvailability;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> Result<String, ExecError> {
        let line = cmd.to_string();
        debug!("exec"; "{line}");

        let spawn_err = |source| ExecError::Spawn {
            command: line.clone(),
            source,
        };

        // One pipe for both streams keeps their relative order.
        let (mut reader, writer) = std::io::pipe().map_err(spawn_err)?;
        let mut child = Command::new(cmd.program())
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(writer.try_clone().map_err(spawn_err)?)
            .stderr(writer)
            .spawn()
            .map_err(spawn_err)?;

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw).map_err(spawn_err)?;
        let status = child.wait().map_err(spawn_err)?;

        let output = String::from_utf8_lossy(&raw).into_owned();
        let trimmed = output.trim_end();
        if !trimmed.is_empty() {
            debug!("exec"; "{trimmed}");
        }

        if !status.success() {
            return Err(ExecError::Process {
                command: line,
                status: status.to_string(),
                output: output.trim().to_string(),
            });
        }
        Ok(output)
    }

    fn locate(&self, program: &OsStr) -> ToolAvailability {
        match which::which(program) {
            Ok(path) => ToolAvailability::Found(path),
            Err(_) => ToolAvailability::Missing,
        }
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output.
///
/// Used to drop known warnings or irrelevant lines before output is parsed.
pub struct FilterRule {
    /// Prefixes of lines to skip.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, ANSI codes removed.
    pub fn lines(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(strip_ansi)
            .filter(|line| !self.should_skip(line.trim()))
            .map(std::borrow::Cow::into_owned)
            .collect()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

// ============================================================================
// Tests
// ============================================================================

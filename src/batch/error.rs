//! Batch error types.

use std::path::PathBuf;

use thiserror::Error;

use super::geometry::{Mismatch, ParseError};
use crate::utils::exec::ExecError;
use crate::utils::path::PathError;
use crate::utils::tool::MissingTool;

/// Errors raised by the batch transform engine.
///
/// Every variant aborts the batch; nothing is retried or skipped.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("`{program}` not found on PATH, {hint}")]
    MissingTool { program: String, hint: &'static str },

    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("no input images given")]
    EmptyBatch,

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

    #[error("cannot read trim geometry of `{}`", .file.display())]
    Geometry {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{0}")]
    GeometryInvariant(Mismatch),

    #[error("refusing to overwrite input `{}`", .0.display())]
    SameOutput(PathBuf),

    #[error("scratch file `{}` is an input image, use another temp dir", .0.display())]
    ScratchAliasesInput(PathBuf),

    #[error("IO error at `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

pub type BatchResult<T> = Result<T, BatchError>;

impl From<MissingTool> for BatchError {
    fn from(MissingTool { program, hint }: MissingTool) -> Self {
        Self::MissingTool { program, hint }
    }
}

impl From<ExecError> for BatchError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Spawn { command, source } => Self::Spawn { command, source },
            ExecError::Process {
                command,
                status,
                output,
            } => Self::Process {
                command,
                status,
                output,
            },
        }
    }
}

impl From<PathError> for BatchError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::NotFound(path) => Self::NotFound(path),
            PathError::Io(path, source) => Self::Io(path, source),
        }
    }
}

//! Batch transform engine.
//!
//! Every operation is one linear pass:
//!
//! ```text
//! probe tool → resolve inputs → prepare scratch → (trim: measure) → options
//!            → convert each file into scratch → move to destination
//! ```
//!
//! A failure aborts the batch where it happens: files before it are already
//! in place, the failing file and everything after it are untouched.
//!
//! # Modules
//!
//! - [`options`]: converter option fragments and the `Background` option
//! - [`geometry`]: trim report parsing and the unified crop
//! - [`trim`]: the measure pass and the trim operation
//! - [`svg`]: SVG rasterization with `rsvg-convert`

mod error;
pub mod geometry;
pub mod options;
pub mod svg;
pub mod trim;

#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

pub use error::{BatchError, BatchResult};
pub use geometry::UnifiedCrop;
pub use options::{Background, TransformOptions};
pub use svg::rasterize_svg;
pub use trim::trim;

use crate::config::ToolsConfig;
use crate::logger::ProgressLine;
use crate::utils::exec::Runner;
use crate::utils::path::{
    Destination, ScratchDir, is_same_file, move_file, prepare_scratch, resolve_inputs,
};
use crate::utils::tool::ToolCommand;

const CONVERT_HINT: &str = "please install ImageMagick";
const RSVG_HINT: &str = "please install librsvg (rsvg-convert)";

/// Everything an operation needs besides its own parameters.
pub struct BatchContext<'a> {
    /// Executes the external tools.
    pub runner: &'a dyn Runner,
    /// Configured tool commands.
    pub tools: &'a ToolsConfig,
    /// Scratch directory; a unique one is generated when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// Where results are moved.
    pub destination: Destination,
}

impl<'a> BatchContext<'a> {
    pub fn new(runner: &'a dyn Runner, tools: &'a ToolsConfig) -> Self {
        Self {
            runner,
            tools,
            scratch_dir: None,
            destination: Destination::Overwrite,
        }
    }

    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    fn convert(&self) -> ToolCommand<'_> {
        ToolCommand::new(&self.tools.convert, CONVERT_HINT)
    }

    fn rsvg(&self) -> ToolCommand<'_> {
        ToolCommand::new(&self.tools.rsvg, RSVG_HINT)
    }
}

/// Outcome of a converter batch.
#[derive(Debug)]
pub struct BatchReport {
    /// Final location of every processed image, in input order.
    pub outputs: Vec<PathBuf>,
    /// Scratch directory used (left in place).
    pub scratch: ScratchDir,
    /// Crop applied by `trim`.
    pub crop: Option<UnifiedCrop>,
}

/// Flatten a batch of images onto their background.
pub fn flatten(ctx: &BatchContext<'_>, files: &[PathBuf]) -> BatchResult<BatchReport> {
    let (files, scratch) = prepare(ctx, files)?;
    let options = TransformOptions::flatten();
    let outputs = convert_all(ctx, "flatten", &files, &options, &scratch)?;
    Ok(BatchReport {
        outputs,
        scratch,
        crop: None,
    })
}

/// Apply a background color to a batch of images.
///
/// A real color also removes the alpha channel; `Transparent` keeps it.
pub fn set_background(
    ctx: &BatchContext<'_>,
    files: &[PathBuf],
    background: &Background,
    flatten: bool,
) -> BatchResult<BatchReport> {
    let (files, scratch) = prepare(ctx, files)?;
    let options = TransformOptions::background(background, flatten);
    let outputs = convert_all(ctx, "background", &files, &options, &scratch)?;
    Ok(BatchReport {
        outputs,
        scratch,
        crop: None,
    })
}

/// Shared start of every converter batch.
///
/// The probe comes first so that a missing tool never leaves a scratch
/// directory behind. No scratch file may be one of the inputs, otherwise
/// the converter would write over an image before it is moved.
fn prepare(ctx: &BatchContext<'_>, files: &[PathBuf]) -> BatchResult<(Vec<PathBuf>, ScratchDir)> {
    ctx.convert().probe(ctx.runner)?;
    let files = resolve(files)?;
    let scratch = prepare_scratch(ctx.scratch_dir.as_deref())?;
    for file in &files {
        check_scratch_file(&scratch_path(&scratch, file)?, &files)?;
    }
    Ok((files, scratch))
}

/// Absolute paths of a non-empty batch of existing images.
fn resolve(files: &[PathBuf]) -> BatchResult<Vec<PathBuf>> {
    if files.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    Ok(resolve_inputs(files)?)
}

/// Fail if writing to `scratch_file` would clobber one of `files`.
fn check_scratch_file(scratch_file: &Path, files: &[PathBuf]) -> BatchResult<()> {
    match files.iter().find(|file| is_same_file(scratch_file, file)) {
        Some(file) => Err(BatchError::ScratchAliasesInput(file.clone())),
        None => Ok(()),
    }
}

/// Run the converter once per file into scratch, then move into place.
fn convert_all(
    ctx: &BatchContext<'_>,
    module: &'static str,
    files: &[PathBuf],
    options: &TransformOptions,
    scratch: &ScratchDir,
) -> BatchResult<Vec<PathBuf>> {
    let args = options.args();
    let mut progress = ProgressLine::new(module, "convert", files.len());
    let mut outputs = Vec::with_capacity(files.len());

    for file in files {
        let temp = scratch_path(scratch, file)?;
        let cmd = ctx.convert().cmd().args(&args).arg(file).arg(&temp);
        ctx.runner.run(&cmd)?;

        let dest = ctx.destination.for_input(file);
        move_file(&temp, &dest)?;
        outputs.push(dest);
        progress.inc();
    }

    progress.finish();
    Ok(outputs)
}

/// Scratch location of a file, keeping its name (and thus its format).
fn scratch_path(scratch: &ScratchDir, file: &Path) -> BatchResult<PathBuf> {
    file.file_name()
        .map(|name| scratch.join(name))
        .ok_or_else(|| BatchError::NotFound(file.to_path_buf()))
}

//! SVG rasterization with `rsvg-convert`.
//!
//! Unlike the converter operations there is no scratch step: each output is
//! a new file next to its input (`logo.svg` -> `logo.png`), so the source
//! is never overwritten.

use std::path::PathBuf;

use super::{BatchContext, BatchError, BatchResult, Background, resolve};
use crate::logger::ProgressLine;
use crate::utils::path::with_extension;

/// Rasterize every SVG of a batch into `extension` format.
///
/// Returns the written paths in input order.
pub fn rasterize_svg(
    ctx: &BatchContext<'_>,
    files: &[PathBuf],
    background: &Background,
    extension: &str,
) -> BatchResult<Vec<PathBuf>> {
    let tool = ctx.rsvg();
    tool.probe(ctx.runner)?;
    let files = resolve(files)?;

    let mut progress = ProgressLine::new("svg", "rasterize", files.len());
    let mut outputs = Vec::with_capacity(files.len());

    for file in &files {
        let dest = with_extension(file, extension);
        if dest == *file {
            return Err(BatchError::SameOutput(dest));
        }

        let cmd = tool
            .cmd()
            .args(["-b", background.as_arg()])
            .arg(file)
            .arg("-o")
            .arg(&dest);
        ctx.runner.run(&cmd)?;

        outputs.push(dest);
        progress.inc();
    }

    progress.finish();
    Ok(outputs)
}

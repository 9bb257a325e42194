//! `trim`, `flatten` and `background` commands.
//!
//! The three commands share the converter pipeline: build a [`BatchContext`]
//! from the effective config, run the batch with the real tools, then clean
//! up a scratch directory that was generated for this run.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::batch::{self, Background, BatchContext, BatchReport, BatchResult};
use crate::config::Config;
use crate::log;
use crate::utils::exec::SystemRunner;
use crate::utils::path::Destination;
use crate::utils::plural::plural_count;

/// Background of `trim` when neither CLI nor config set one.
const TRIM_BACKGROUND: &str = "white";

/// Crop a frame sequence to one shared bounding box.
pub fn trim_images(config: &Config, images: &[PathBuf]) -> Result<()> {
    let background = config
        .defaults
        .background
        .clone()
        .unwrap_or_else(|| Background::Color(TRIM_BACKGROUND.to_string()));

    run_batch(config, "trim", |ctx| {
        batch::trim(ctx, images, &background, config.defaults.flatten)
    })
}

/// Flatten every image onto its background.
pub fn flatten_images(config: &Config, images: &[PathBuf]) -> Result<()> {
    run_batch(config, "flatten", |ctx| batch::flatten(ctx, images))
}

/// Put every image on `background`.
pub fn set_background(
    config: &Config,
    background: &Background,
    images: &[PathBuf],
) -> Result<()> {
    run_batch(config, "background", |ctx| {
        batch::set_background(ctx, images, background, config.defaults.flatten)
    })
}

fn run_batch<F>(config: &Config, module: &'static str, op: F) -> Result<()>
where
    F: FnOnce(&BatchContext<'_>) -> BatchResult<BatchReport>,
{
    let runner = SystemRunner;
    let ctx = BatchContext::new(&runner, &config.tools)
        .with_scratch_dir(config.defaults.temp_dir.clone())
        .with_destination(Destination::from_suffix(config.defaults.append.as_deref()));

    let report = op(&ctx)?;

    if report.scratch.is_generated() {
        report
            .scratch
            .remove()
            .with_context(|| format!("failed to clean up {}", report.scratch.path().display()))?;
    }

    let written = plural_count(report.outputs.len(), "image");
    match report.crop {
        Some(crop) => log!("done"; "{}: {} written at {}", module, written, crop),
        None => log!("done"; "{}: {} written", module, written),
    }
    Ok(())
}

//! `rasterize` command.

use std::path::PathBuf;

use anyhow::Result;

use crate::batch::{self, BatchContext};
use crate::config::Config;
use crate::log;
use crate::utils::exec::SystemRunner;
use crate::utils::plural::plural_count;

/// Rasterize SVG files next to their source.
pub fn rasterize_svgs(config: &Config, svgs: &[PathBuf]) -> Result<()> {
    let runner = SystemRunner;
    let ctx = BatchContext::new(&runner, &config.tools);
    let background = config.defaults.background.clone().unwrap_or_default();

    let outputs = batch::rasterize_svg(&ctx, svgs, &background, &config.defaults.extension)?;

    for output in &outputs {
        crate::debug!("svg"; "{}", output.display());
    }
    log!("done"; "rasterize: {} written", plural_count(outputs.len(), "file"));
    Ok(())
}

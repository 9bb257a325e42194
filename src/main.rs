//! makemovie - batch image preparation for frame sequences.
//!
//! Flattens, recolors, trims and rasterizes images by driving ImageMagick
//! `convert` and librsvg `rsvg-convert`.

mod batch;
mod cli;
mod config;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Trim { images, .. } => cli::transform::trim_images(&config, images),
        Commands::Flatten { images, .. } => cli::transform::flatten_images(&config, images),
        Commands::Background {
            background, images, ..
        } => cli::transform::set_background(&config, background, images),
        Commands::Rasterize { svgs, .. } => cli::rasterize::rasterize_svgs(&config, svgs),
    }
}

//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::batch::Background;

/// Batch image preparation for frame sequences (ImageMagick + librsvg)
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: makemovie.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Echo every external command and its output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Crop every image to one shared bounding box
    #[command(visible_alias = "t")]
    Trim {
        #[command(flatten)]
        output: OutputArgs,

        /// Background color, or `none` to keep transparency (default: white)
        #[arg(short, long, value_name = "COLOR")]
        background: Option<Background>,

        /// Flatten layers after cropping
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        flatten: Option<bool>,

        /// Images to trim
        #[arg(required = true, value_name = "IMAGE", value_hint = clap::ValueHint::FilePath)]
        images: Vec<PathBuf>,
    },

    /// Flatten every image onto its background
    #[command(visible_alias = "f")]
    Flatten {
        #[command(flatten)]
        output: OutputArgs,

        /// Images to flatten
        #[arg(required = true, value_name = "IMAGE", value_hint = clap::ValueHint::FilePath)]
        images: Vec<PathBuf>,
    },

    /// Put every image on a background color
    #[command(visible_alias = "b")]
    Background {
        #[command(flatten)]
        output: OutputArgs,

        /// Flatten layers after applying the background
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        flatten: Option<bool>,

        /// Background color, or `none` to keep transparency
        #[arg(value_name = "COLOR")]
        background: Background,

        /// Images to recolor
        #[arg(required = true, value_name = "IMAGE", value_hint = clap::ValueHint::FilePath)]
        images: Vec<PathBuf>,
    },

    /// Rasterize SVG files next to their source
    #[command(visible_alias = "r")]
    Rasterize {
        /// Background color, or `none` to keep transparency (default: none)
        #[arg(short, long, value_name = "COLOR")]
        background: Option<Background>,

        /// Output extension (default: png)
        #[arg(short, long, value_name = "EXT")]
        ext: Option<String>,

        /// SVG files to rasterize
        #[arg(required = true, value_name = "SVG", value_hint = clap::ValueHint::FilePath)]
        svgs: Vec<PathBuf>,
    },
}

/// Output arguments shared by the converter commands.
#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// Write `name<SUFFIX>.ext` next to each input instead of overwriting it
    #[arg(short, long, value_name = "SUFFIX")]
    pub append: Option<String>,

    /// Scratch directory for intermediate files (default: a new temp dir, removed afterwards)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub temp_dir: Option<PathBuf>,
}

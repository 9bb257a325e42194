//! Command-line interface module.

mod args;
pub mod rasterize;
pub mod transform;

pub use args::{Cli, Commands, OutputArgs};

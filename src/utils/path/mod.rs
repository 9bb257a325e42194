//! Path utilities.
//!
//! - [`fs`]: normalization, input resolution, file relocation
//! - [`scratch`]: scratch directory management
//! - [`destination`]: output paths (overwrite or append suffix)

pub mod destination;
pub mod fs;
pub mod scratch;

pub use destination::{Destination, with_extension};
pub use fs::{PathError, is_same_file, move_file, normalize_path, resolve_inputs};
pub use scratch::{ScratchDir, prepare_scratch};

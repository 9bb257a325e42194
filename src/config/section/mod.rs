//! Configuration section definitions.
//!
//! Each module corresponds to a section in `makemovie.toml`:
//!
//! | Module     | TOML Section   | Purpose                             |
//! |------------|----------------|-------------------------------------|
//! | `defaults` | `[defaults]`   | Default options of every operation  |
//! | `tools`    | `[tools]`      | External tool commands              |

mod defaults;
mod tools;

pub use defaults::DefaultsConfig;
pub use tools::ToolsConfig;

//! Utility modules: process execution, tool discovery, paths.

pub mod exec;
pub mod path;
pub mod plural;
pub mod tool;

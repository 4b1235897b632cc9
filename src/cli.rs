//! Command frontends shared by the `read-version` and `update-version` binaries

pub mod args;
pub mod common;
pub mod read;
pub mod update;

// Re-export types for convenient access
pub use args::{ColorChoice, CommonArgs, ReadVersionCli, UpdateVersionCli};
pub use common::Usage;

//! CLI argument parsing using clap
//!
//! Positional arguments are collected as a plain list so that the tools can
//! report a wrong argument count with their own exit code.

use clap::{ArgAction, Args, Parser, ValueEnum};
use std::path::PathBuf;

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// Options accepted by both tools
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// TOML file overriding the built-in manifest and search settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Error output coloring
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

/// read-version entry point
#[derive(Parser, Debug)]
#[command(name = "read-version")]
#[command(about = "Print the version declared in a project file, without any pre-release suffix")]
#[command(version)]
pub struct ReadVersionCli {
    /// Project file, or a directory to search for one
    #[arg(value_name = "PROJECT_FILE_OR_PATH")]
    pub args: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// update-version entry point
#[derive(Parser, Debug)]
#[command(name = "update-version")]
#[command(about = "Set the version of a project file and of its own package references")]
#[command(version)]
pub struct UpdateVersionCli {
    /// Project file or directory, followed by the new version
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

//! Error types for versiontools
//!
//! Each layer has its own error enum (`LocateError` for project discovery,
//! `ManifestError` for the XML document, `ConfigError` for configuration).
//! `ToolError` wraps them for the command frontends and owns the mapping to
//! process exit codes.

use crate::cli::common::{
    EXIT_BAD_ARGS, EXIT_BAD_FILENAME, EXIT_BAD_PATH, EXIT_EXCEPTION, EXIT_NO_VERSION,
};
use crate::manifest::document::ManifestError;
use crate::manifest::locator::LocateError;
use std::path::PathBuf;

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Configuration error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML or unknown values
    #[error("Configuration error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Well-formed but unusable settings
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Top-level error type for the command frontends
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Wrong number of positional arguments
    #[error(
        "Invalid number of command line arguments specified. Received {received}, expected {expected}."
    )]
    BadArgs { received: usize, expected: usize },

    /// Option the argument parser did not accept
    #[error("{0}")]
    InvalidOption(String),

    /// Manifest parsed but it declares no version
    #[error("No <Version> tag found.")]
    NoVersion { path: PathBuf },

    /// Project discovery error
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// Manifest load, update or save error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ToolError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::BadArgs { .. } | ToolError::InvalidOption(_) => EXIT_BAD_ARGS,
            ToolError::NoVersion { .. } => EXIT_NO_VERSION,
            ToolError::Locate(LocateError::NotAManifest(_))
            | ToolError::Locate(LocateError::BadFileName(_)) => EXIT_BAD_FILENAME,
            ToolError::Locate(LocateError::BadPath(_)) => EXIT_BAD_PATH,
            ToolError::Locate(_) | ToolError::Manifest(_) | ToolError::Config(_) => EXIT_EXCEPTION,
        }
    }
}

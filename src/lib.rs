#![forbid(unsafe_code)]

//! versiontools: read and update the version declared in MSBuild project files
//!
//! The library behind the `read-version` and `update-version` build pipeline
//! tools. It resolves a path to project manifests, reads the `<Version>`
//! element, and rewrites the version together with the informational-version
//! fields and the organization's own package references.

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod version;

// Re-export error types for convenient access
pub use error::{ConfigError, ToolError};

// Re-export core domain types for convenient access
pub use config::{SearchMode, ToolConfig};
pub use manifest::{ManifestLocator, ProjectManifest};
pub use version::{informational_version, raw_version};

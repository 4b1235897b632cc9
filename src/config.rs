//! Tool configuration
//!
//! The manifest schema these tools operate on is fixed, so every setting has a
//! built-in default. A TOML file passed with `--config` may override them:
//!
//! ```toml
//! [manifest]
//! pattern = "*.csproj"
//! package_prefix = "Gemstone."
//!
//! [search]
//! mode = "recursive"
//! source_dir = "src"
//! root_namespace = "Gemstone"
//! unqualified_project = "common"
//! ```

use crate::error::ConfigError;
use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration shared by both tools
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Manifest schema settings
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Project discovery settings
    #[serde(default)]
    pub search: SearchConfig,
}

impl ToolConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: ToolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                tracing::debug!("loading configuration from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.manifest.matcher()?;

        if self.manifest.package_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "manifest.package_prefix must not be empty".to_string(),
            ));
        }

        for (field, value) in [
            ("search.source_dir", &self.search.source_dir),
            ("search.root_namespace", &self.search.root_namespace),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        Ok(())
    }
}

/// `[manifest]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Glob matched case-insensitively against manifest file names
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Package references whose `Include` starts with this prefix follow the
    /// project version
    #[serde(default = "default_package_prefix")]
    pub package_prefix: String,
}

impl ManifestConfig {
    /// Compiles the manifest file name pattern
    pub fn matcher(&self) -> Result<GlobMatcher, ConfigError> {
        GlobBuilder::new(&self.pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid manifest glob pattern '{}': {}",
                    self.pattern, e
                ))
            })
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            package_prefix: default_package_prefix(),
        }
    }
}

fn default_pattern() -> String {
    "*.csproj".to_string()
}

fn default_package_prefix() -> String {
    "Gemstone.".to_string()
}

/// How the read tool turns a directory into manifest candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Every manifest below the directory, hidden directories excluded
    #[default]
    Recursive,
    /// A single manifest in the directory or its conventional project folder
    Conventional,
}

/// `[search]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Discovery mode used by `read-version`
    #[serde(default)]
    pub mode: SearchMode,

    /// Folder holding project folders in a repository checkout
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Namespace that project folders are named after
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,

    /// Repository whose project folder is the bare root namespace
    #[serde(default = "default_unqualified_project")]
    pub unqualified_project: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            source_dir: default_source_dir(),
            root_namespace: default_root_namespace(),
            unqualified_project: default_unqualified_project(),
        }
    }
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_root_namespace() -> String {
    "Gemstone".to_string()
}

fn default_unqualified_project() -> String {
    "common".to_string()
}

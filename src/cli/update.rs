//! update-version command implementation
//!
//! This module implements `update-version`, which:
//! - Resolves the given path to exactly one project file
//! - Sets `<Version>` to the requested version
//! - Rewrites each `<InformationalVersion>`, keeping any text after its first space
//! - Pins the organization's own package references to the raw version
//! - Saves the project file in place

use crate::cli::args::CommonArgs;
use crate::cli::common::{EXIT_SUCCESS, Usage, load_config, report_error};
use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::manifest::{ManifestLocator, ProjectManifest};
use std::path::{Path, PathBuf};

/// Positional arguments of `update-version`
pub const USAGE: Usage = Usage {
    program: "update-version",
    arg_names: &["ProjectFileOrPath", "Version"],
    arg_examples: &["~/projects/gemstone/io", "1.0.2-beta"],
};

/// Result of a successful update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Project file that was rewritten
    pub manifest_path: PathBuf,
    /// Version written to `<Version>`
    pub version: String,
}

impl UpdateOutcome {
    /// Confirmation printed on success
    pub fn message(&self) -> String {
        let file_name = self
            .manifest_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        format!(
            "Successfully updated version to \"{}\" in \"{}\" project file.",
            self.version, file_name
        )
    }
}

/// Run the update-version command
///
/// # Returns
///
/// Exit code:
/// - 0: Success, project file saved
/// - 0xA0: Wrong number of arguments
/// - 0xA1: Not a project file and not a directory
/// - 0xA2: Directory without a usable project file
/// - 0xA3: Project file has no `<Version>`
/// - 0xFF: Any other error; the project file is left untouched
pub fn run_update_version(args: &[String], common: &CommonArgs) -> i32 {
    match run_update_version_inner(args, common) {
        Ok(outcome) => {
            println!("{}", outcome.message());
            EXIT_SUCCESS
        }
        Err(e) => report_error(&USAGE, &e, common.color),
    }
}

fn run_update_version_inner(
    args: &[String],
    common: &CommonArgs,
) -> Result<UpdateOutcome, ToolError> {
    USAGE.validate_args(args)?;
    let config = load_config(common)?;
    update_version(Path::new(args[0].trim()), args[1].trim(), &config)
}

/// Writes `version` into the single project file resolved from `search_path`
pub fn update_version(
    search_path: &Path,
    version: &str,
    config: &ToolConfig,
) -> Result<UpdateOutcome, ToolError> {
    let locator = ManifestLocator::new(config)?;
    let manifest_path = locator.resolve_single(search_path)?;

    let mut manifest = ProjectManifest::load(&manifest_path)?;
    if manifest.version_node().is_none() {
        return Err(ToolError::NoVersion {
            path: manifest_path,
        });
    }

    manifest.write_version(version, &config.manifest.package_prefix)?;
    manifest.save(&manifest_path)?;

    tracing::info!("updated {} to {}", manifest_path.display(), version);
    Ok(UpdateOutcome {
        manifest_path,
        version: version.to_string(),
    })
}

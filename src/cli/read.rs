//! read-version command implementation
//!
//! Resolves the given path to one or more project files and prints the
//! version of the first one that declares it, without any pre-release
//! suffix. Nothing but the version is written to stdout.

use crate::cli::args::CommonArgs;
use crate::cli::common::{EXIT_SUCCESS, Usage, load_config, report_error};
use crate::config::{SearchMode, ToolConfig};
use crate::error::ToolError;
use crate::manifest::{ManifestLocator, ProjectManifest};
use crate::version::raw_version;
use std::path::Path;

/// Positional arguments of `read-version`
pub const USAGE: Usage = Usage {
    program: "read-version",
    arg_names: &["ProjectFileOrPath"],
    arg_examples: &["~/projects/gemstone/io"],
};

/// Run the read-version command
///
/// # Returns
///
/// Exit code:
/// - 0: Success, version printed
/// - 0xA0: Wrong number of arguments
/// - 0xA1: Not a project file and not a directory
/// - 0xA2: Directory without project files
/// - 0xA3: No project file declares a version
/// - 0xFF: Any other error
pub fn run_read_version(args: &[String], common: &CommonArgs) -> i32 {
    match run_read_version_inner(args, common) {
        Ok(version) => {
            println!("{}", version);
            EXIT_SUCCESS
        }
        Err(e) => report_error(&USAGE, &e, common.color),
    }
}

fn run_read_version_inner(args: &[String], common: &CommonArgs) -> Result<String, ToolError> {
    USAGE.validate_args(args)?;
    let config = load_config(common)?;
    read_version(Path::new(args[0].trim()), &config)
}

/// Reads the raw version for `search_path`
///
/// In recursive mode every project file under a directory is a candidate and
/// the first one (in discovery order) with a `<Version>` element wins, even an
/// empty one. In conventional mode the single resolved project file must have it.
pub fn read_version(search_path: &Path, config: &ToolConfig) -> Result<String, ToolError> {
    let locator = ManifestLocator::new(config)?;

    let candidates = match config.search.mode {
        SearchMode::Recursive => locator.resolve_all(search_path)?,
        SearchMode::Conventional => vec![locator.resolve_single(search_path)?],
    };

    for candidate in &candidates {
        let manifest = ProjectManifest::load(candidate)?;
        match manifest.version_node() {
            Some(node) => {
                tracing::info!("version {} from {}", node.text(), candidate.display());
                return Ok(raw_version(node.text()).to_string());
            }
            None => tracing::debug!("no version in {}", candidate.display()),
        }
    }

    Err(ToolError::NoVersion {
        path: search_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, version: Option<&str>) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let body = match version {
            Some(v) => format!("<Project><PropertyGroup><Version>{v}</Version></PropertyGroup></Project>"),
            None => "<Project><PropertyGroup /></Project>".to_string(),
        };
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_read_version_strips_suffix() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("Gemstone.IO.csproj");
        write(&project, Some("1.2.3-beta-2"));

        let version = read_version(&project, &ToolConfig::default()).unwrap();
        assert_eq!(version, "1.2.3");
    }

    #[test]
    fn test_read_version_skips_candidates_without_version() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("a/Build.csproj"), None);
        write(&temp.path().join("b/Gemstone.IO.csproj"), Some("4.0.0"));

        let version = read_version(temp.path(), &ToolConfig::default()).unwrap();
        assert_eq!(version, "4.0.0");
    }

    #[test]
    fn test_read_version_empty_version_is_returned() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("Blank.csproj");
        write(&project, Some(""));

        let version = read_version(&project, &ToolConfig::default()).unwrap();
        assert_eq!(version, "");
    }

    #[test]
    fn test_read_version_empty_version_stops_search() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("a/Blank.csproj"), Some(""));
        write(&temp.path().join("b/Gemstone.IO.csproj"), Some("4.0.0"));

        let version = read_version(temp.path(), &ToolConfig::default()).unwrap();
        assert_eq!(version, "");
    }

    #[test]
    fn test_read_version_conventional_mode() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("common");
        write(&repo.join("src/Gemstone/Gemstone.Common.csproj"), Some("1.0.9"));

        let mut config = ToolConfig::default();
        config.search.mode = SearchMode::Conventional;

        let version = read_version(&repo, &config).unwrap();
        assert_eq!(version, "1.0.9");
    }

    #[test]
    fn test_bad_arg_count() {
        let result = run_read_version_inner(&[], &CommonArgs::default());
        assert!(matches!(
            result,
            Err(ToolError::BadArgs {
                received: 0,
                expected: 1
            })
        ));
    }
}

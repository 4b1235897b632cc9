//! End-to-end tests for the release workflow
//!
//! A build pipeline bumps the version of a repository checkout with
//! update-version and reads it back with read-version. These tests drive the
//! library entry points the binaries use against realistic checkouts.

mod common;

use common::{GEMSTONE_PROJECT, TestResult, project_with_version, write_file};
use std::fs;
use tempfile::TempDir;
use versiontools::ToolConfig;
use versiontools::cli::read::read_version;
use versiontools::cli::update::update_version;
use versiontools::error::ToolError;

/// Lays out a checkout the way the organization's repositories look
fn create_checkout(root: &std::path::Path) {
    write_file(root, "io/.git/HEAD", "ref: refs/heads/main\n");
    write_file(root, "io/.git/modules/old/Old.csproj", &project_with_version("0.0.1"));
    write_file(root, "io/src/Gemstone.io/Gemstone.IO.csproj", GEMSTONE_PROJECT);
    write_file(root, "io/README.md", "# Gemstone.IO\n");
}

#[test]
fn test_bump_then_read() -> TestResult {
    let temp = TempDir::new()?;
    create_checkout(temp.path());
    let repo = temp.path().join("io");
    let config = ToolConfig::default();

    assert_eq!(read_version(&repo, &config)?, "1.0.0");

    let outcome = update_version(&repo, "1.1.0-beta", &config)?;
    assert_eq!(
        outcome.manifest_path,
        repo.join("src/Gemstone.io/Gemstone.IO.csproj")
    );

    assert_eq!(read_version(&repo, &config)?, "1.1.0");
    Ok(())
}

#[test]
fn test_release_cycle_keeps_informational_suffix() -> TestResult {
    let temp = TempDir::new()?;
    create_checkout(temp.path());
    let repo = temp.path().join("io");
    let config = ToolConfig::default();

    for version in ["1.1.0-beta", "1.1.0-rc", "1.1.0"] {
        update_version(&repo, version, &config)?;
    }

    let saved = fs::read_to_string(repo.join("src/Gemstone.io/Gemstone.IO.csproj"))?;
    assert!(saved.contains("<Version>1.1.0</Version>"));
    assert!(saved.contains("<InformationalVersion>1.1.0 custom suffix</InformationalVersion>"));
    assert!(saved.contains(r#"<PackageReference Include="Gemstone.Common" Version="1.1.0" />"#));
    Ok(())
}

#[test]
fn test_hidden_directories_never_supply_a_version() -> TestResult {
    let temp = TempDir::new()?;
    write_file(temp.path(), "repo/.git/modules/Old.csproj", &project_with_version("0.0.1"));
    write_file(temp.path(), "repo/src/App/App.csproj", "<Project><PropertyGroup /></Project>");

    let result = read_version(&temp.path().join("repo"), &ToolConfig::default());
    assert!(matches!(result, Err(ToolError::NoVersion { .. })));
    Ok(())
}

#[test]
fn test_failed_update_keeps_checkout_intact() -> TestResult {
    let temp = TempDir::new()?;
    let broken = GEMSTONE_PROJECT.replace(
        r#"<PackageReference Include="Gemstone.Common" Version="1.0.0" />"#,
        r#"<PackageReference Include="Gemstone.Common" />"#,
    );
    let project = write_file(temp.path(), "common/src/Gemstone/Gemstone.Common.csproj", &broken);

    let result = update_version(&temp.path().join("common"), "2.0.0", &ToolConfig::default());
    let err = assert_some!(result.err());
    assert_eq!(err.exit_code(), 0xFF);

    assert_eq!(fs::read_to_string(&project)?, broken);
    let leftovers: Vec<_> = fs::read_dir(project.parent().unwrap_or(temp.path()))?
        .filter_map(Result::ok)
        .map(|entry| entry.file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "no temporary files should remain");
    Ok(())
}

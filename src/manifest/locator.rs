//! Project manifest discovery
//!
//! Turns a user-supplied path into manifest file paths. Two strategies exist:
//!
//! - [`ManifestLocator::resolve_all`] walks a directory tree and returns every
//!   manifest in discovery order, never descending into hidden directories.
//! - [`ManifestLocator::resolve_single`] returns exactly one manifest, looking
//!   directly inside the directory and then in its conventional project
//!   folder (see [`conventional_project_dir`]).

use crate::config::{SearchConfig, ToolConfig};
use crate::error::ConfigError;
use globset::GlobMatcher;
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while resolving manifest paths
#[derive(Debug, Error)]
pub enum LocateError {
    /// An existing file that is not a manifest
    #[error("Bad project name specified.")]
    NotAManifest(PathBuf),

    /// Neither an existing manifest nor an existing directory
    #[error("Bad project name or path specified.")]
    BadFileName(PathBuf),

    /// A directory without any usable manifest
    #[error("Bad project path specified.")]
    BadPath(PathBuf),

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolves search paths to manifest files
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    matcher: GlobMatcher,
    search: SearchConfig,
}

impl ManifestLocator {
    /// Creates a locator for the manifest pattern and layout in `config`
    pub fn new(config: &ToolConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            matcher: config.manifest.matcher()?,
            search: config.search.clone(),
        })
    }

    /// Returns true if the file name of `path` matches the manifest pattern
    pub fn is_manifest(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matcher.is_match(Path::new(name)))
    }

    /// Resolves `search_path` to every manifest beneath it
    ///
    /// A manifest file yields itself. A directory is searched at any depth,
    /// skipping every subtree rooted at a directory whose name starts with
    /// `.`. Files of a directory come before those of its subdirectories and
    /// entries are visited in name order.
    pub fn resolve_all(&self, search_path: &Path) -> Result<Vec<PathBuf>, LocateError> {
        if search_path.is_file() {
            return self.check_manifest_file(search_path).map(|path| vec![path]);
        }

        if !search_path.is_dir() {
            return Err(LocateError::BadFileName(search_path.to_path_buf()));
        }

        let walker = WalkBuilder::new(search_path)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_path(|a, b| {
                a.is_dir()
                    .cmp(&b.is_dir())
                    .then_with(|| a.file_name().cmp(&b.file_name()))
            })
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_dir(entry))
            .build();

        let mut manifests = Vec::new();
        for result in walker {
            let entry = result?;
            if entry.path().is_file() && self.is_manifest(entry.path()) {
                manifests.push(entry.into_path());
            }
        }

        if manifests.is_empty() {
            return Err(LocateError::BadPath(search_path.to_path_buf()));
        }

        tracing::debug!(
            "found {} manifest(s) under {}",
            manifests.len(),
            search_path.display()
        );
        Ok(manifests)
    }

    /// Resolves `search_path` to exactly one manifest
    ///
    /// A directory is first searched for a manifest directly inside it, then
    /// inside its conventional project folder.
    pub fn resolve_single(&self, search_path: &Path) -> Result<PathBuf, LocateError> {
        if search_path.is_file() {
            return self.check_manifest_file(search_path);
        }

        if self.is_manifest(search_path) || !search_path.is_dir() {
            return Err(LocateError::BadFileName(search_path.to_path_buf()));
        }

        if let Some(manifest) = self.first_manifest_in(search_path)? {
            return Ok(manifest);
        }

        let last_name = last_directory_name(search_path)?;
        let project_dir = conventional_project_dir(search_path, &last_name, &self.search);
        tracing::debug!(
            "no manifest in {}, trying {}",
            search_path.display(),
            project_dir.display()
        );

        if project_dir.is_dir()
            && let Some(manifest) = self.first_manifest_in(&project_dir)?
        {
            return Ok(manifest);
        }

        Err(LocateError::BadPath(search_path.to_path_buf()))
    }

    fn check_manifest_file(&self, path: &Path) -> Result<PathBuf, LocateError> {
        if self.is_manifest(path) {
            Ok(path.to_path_buf())
        } else {
            Err(LocateError::NotAManifest(path.to_path_buf()))
        }
    }

    /// First manifest (by file name) directly inside `dir`
    fn first_manifest_in(&self, dir: &Path) -> Result<Option<PathBuf>, LocateError> {
        let entries = fs::read_dir(dir).map_err(|source| LocateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut manifests = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LocateError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && self.is_manifest(&path) {
                manifests.push(path);
            }
        }
        manifests.sort();

        if manifests.len() > 1 {
            tracing::warn!(
                "{} manifests in {}, using {}",
                manifests.len(),
                dir.display(),
                manifests[0].display()
            );
        }

        Ok(manifests.into_iter().next())
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Conventional location of the project folder inside a repository checkout
///
/// A repository checkout `io` keeps its project in
/// `<dir>/<source_dir>/<root_namespace>.<last_name>`, e.g. `io/src/Gemstone.io`.
/// The repository named by
/// `unqualified_project` (compared case-insensitively) uses the bare root
/// namespace instead: `<dir>/<source_dir>/<root_namespace>`.
pub fn conventional_project_dir(dir: &Path, last_name: &str, search: &SearchConfig) -> PathBuf {
    let folder = if last_name.eq_ignore_ascii_case(&search.unqualified_project) {
        search.root_namespace.clone()
    } else {
        format!("{}.{}", search.root_namespace, last_name)
    };

    dir.join(&search.source_dir).join(folder)
}

/// Name of the last directory in `dir`, resolving `.` and `..` through the
/// filesystem when needed
fn last_directory_name(dir: &Path) -> Result<String, LocateError> {
    if let Some(name) = dir.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    let canonical = fs::canonicalize(dir).map_err(|source| LocateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = "<Project><PropertyGroup><Version>1.0.0</Version></PropertyGroup></Project>";

    fn locator() -> ManifestLocator {
        ManifestLocator::new(&ToolConfig::default()).unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, MANIFEST).unwrap();
    }

    #[test]
    fn test_is_manifest() {
        let locator = locator();
        assert!(locator.is_manifest(Path::new("dir/Gemstone.IO.csproj")));
        assert!(locator.is_manifest(Path::new("Upper.CSPROJ")));
        assert!(!locator.is_manifest(Path::new("dir/readme.md")));
        assert!(!locator.is_manifest(Path::new("dir")));
    }

    #[test]
    fn test_conventional_project_dir_qualified() {
        let search = SearchConfig::default();
        let dir = conventional_project_dir(Path::new("/repos/io"), "io", &search);
        assert_eq!(dir, Path::new("/repos/io/src/Gemstone.io"));
    }

    #[test]
    fn test_conventional_project_dir_common_is_unqualified() {
        let search = SearchConfig::default();
        let dir = conventional_project_dir(Path::new("/repos/Common"), "Common", &search);
        assert_eq!(dir, Path::new("/repos/Common/src/Gemstone"));
    }

    #[test]
    fn test_last_directory_name_trailing_separator() {
        let name = last_directory_name(Path::new("/repos/io/")).unwrap();
        assert_eq!(name, "io");
    }

    #[test]
    fn test_last_directory_name_current_dir() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("numeric");
        fs::create_dir_all(&nested).unwrap();

        let name = last_directory_name(&nested.join(".")).unwrap();
        assert_eq!(name, "numeric");
    }

    #[test]
    fn test_resolve_all_skips_nested_hidden_dirs() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a/b/.cache/hidden.csproj"));
        touch(&temp.path().join("a/b/visible.csproj"));

        let found = locator().resolve_all(temp.path()).unwrap();
        assert_eq!(found, vec![temp.path().join("a/b/visible.csproj")]);
    }

    #[test]
    fn test_resolve_all_files_before_subdirectories() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("aaa/first.csproj"));
        touch(&temp.path().join("zzz.csproj"));

        let found = locator().resolve_all(temp.path()).unwrap();
        assert_eq!(
            found,
            vec![
                temp.path().join("zzz.csproj"),
                temp.path().join("aaa/first.csproj"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_manifest_found_by_both_variants() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("shared/Shared.csproj");
        touch(&target);
        let repo = temp.path().join("repo");
        fs::create_dir_all(&repo).unwrap();
        let link = repo.join("Linked.csproj");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(locator().resolve_all(&repo).unwrap(), vec![link.clone()]);
        assert_eq!(locator().resolve_single(&repo).unwrap(), link);
    }

    #[test]
    fn test_resolve_single_prefers_direct_manifest() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("io");
        touch(&repo.join("Direct.csproj"));
        touch(&repo.join("src/Gemstone.io/Gemstone.IO.csproj"));

        let found = locator().resolve_single(&repo).unwrap();
        assert_eq!(found, repo.join("Direct.csproj"));
    }

    #[test]
    fn test_resolve_single_rejects_missing_manifest_name() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("Missing.csproj");

        let result = locator().resolve_single(&missing);
        assert!(matches!(result, Err(LocateError::BadFileName(_))));
    }
}

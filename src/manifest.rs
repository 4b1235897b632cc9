//! Project manifest discovery and editing

pub mod document;
pub mod locator;

pub use document::{ManifestError, PackageReference, ProjectManifest, TextNode, VersionNode};
pub use locator::{LocateError, ManifestLocator, conventional_project_dir};

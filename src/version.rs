//! Version string rules
//!
//! Versions are handled as opaque `MAJOR.MINOR.PATCH[-PRERELEASE]` tokens. The
//! only structure that matters is the first `-`, which separates the release
//! core from an arbitrary pre-release suffix.

/// Returns the release core of a version, dropping everything from the first `-`.
///
/// ```
/// use versiontools::version::raw_version;
///
/// assert_eq!(raw_version("1.2.3-beta"), "1.2.3");
/// assert_eq!(raw_version("1.2.3"), "1.2.3");
/// ```
pub fn raw_version(version: &str) -> &str {
    match version.find('-') {
        Some(index) => &version[..index],
        None => version,
    }
}

/// Computes the new value of an informational-version field.
///
/// When the existing value contains a space it is treated as
/// `VERSION SUFFIXTEXT`: the leading version is replaced and everything from
/// the first space onward is kept as is. Otherwise the whole value becomes
/// `new_version`.
pub fn informational_version(existing: &str, new_version: &str) -> String {
    match existing.find(' ') {
        Some(index) => format!("{}{}", new_version, &existing[index..]),
        None => new_version.to_string(),
    }
}

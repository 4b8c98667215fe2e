//! Path validation and containment utilities.
//!
//! This module provides functions to validate relative paths, resolve
//! absolute ones lexically, and decide whether a file lives inside a root
//! directory without being fooled by `..` segments or shared name prefixes
//! (`/media` does not contain `/media-old/a.png`).

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a relative path for security and correctness.
/// Ensures that paths don't escape their root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mediaopt_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("gallery/photo.png").is_ok());
/// assert!(validate_path("a/../photo.png").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves the root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../still-wrong/.././correct//./photo.png/").unwrap(),
///     Path::new("correct/photo.png")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls; reject them explicitly.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Lexically resolves `.` and `..` segments without touching the filesystem.
///
/// Symlinks are **not** resolved. `..` at the root stays at the root, the
/// same way `cd /..` does.
///
/// ```
/// use std::path::Path;
/// use mediaopt_storage::normalize_path;
/// assert_eq!(normalize_path("/site/public/media/../media/./a.png"), Path::new("/site/public/media/a.png"));
/// assert_eq!(normalize_path("/../a.png"), Path::new("/a.png"));
/// ```
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => normalized.push(component),
            Component::CurDir => {},
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                },
                Some(Component::ParentDir) | None => normalized.push(component),
                // Can't go above the root.
                Some(_) => {},
            },
        }
    }
    normalized
}

/// Returns the path of `path` relative to `root` if, after lexical
/// normalization of both, `path` is strictly inside `root`.
///
/// Containment is decided component-by-component, never by string prefix.
///
/// ```
/// use std::path::Path;
/// use mediaopt_storage::relative_to;
/// let root = Path::new("/site/public/media");
/// assert_eq!(relative_to(root, "/site/public/media/a/b.png").unwrap(), Path::new("a/b.png"));
/// assert!(relative_to(root, "/site/public/media-old/b.png").is_none());
/// assert!(relative_to(root, "/site/public/media/../secret.png").is_none());
/// assert!(relative_to(root, "/site/public/media").is_none());
/// ```
pub fn relative_to(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Option<PathBuf> {
    let root = normalize(root);
    let path = normalize(path);
    let relative = path.strip_prefix(&root).ok()?;
    validate(relative).ok()
}

/// Joins a relative path onto a web prefix using forward slashes.
///
/// ```
/// use std::path::Path;
/// use mediaopt_storage::to_public_path;
/// assert_eq!(to_public_path("/media", Path::new("gallery/a.png")), "/media/gallery/a.png");
/// assert_eq!(to_public_path("/media/", Path::new("a.png")), "/media/a.png");
/// ```
pub fn to_public(prefix: &str, relative: &Path) -> String {
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    format!("{}/{}", prefix.trim_end_matches('/'), segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate(Path::new("gallery/photo.png")).unwrap(), Path::new("gallery/photo.png"));
        assert_eq!(validate(Path::new("a/b/c/photo.png")).unwrap(), Path::new("a/b/c/photo.png"));
        assert_eq!(validate(Path::new("photo.png")).unwrap(), Path::new("photo.png"));
    }

    #[test]
    fn test_path_normalization() {
        // Double slashes are normalized
        assert_eq!(validate(Path::new("a//b//c")).unwrap(), Path::new("a/b/c"));
        // Current directory references removed
        assert_eq!(validate(Path::new("a/./b/./c")).unwrap(), Path::new("a/b/c"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate(Path::new("../etc/passwd")).is_err());
        assert!(validate(Path::new("a/../../b")).is_err());
        assert!(validate(Path::new("..")).is_err());
        assert!(validate(Path::new("../..")).is_err());
    }

    #[test]
    fn test_invalid_characters() {
        assert!(validate(Path::new("a\0b")).is_err());
        assert!(validate(Path::new("\0")).is_err());
    }

    #[test]
    fn test_empty_paths() {
        assert!(validate(Path::new("")).is_err());
        assert!(validate(Path::new(".")).is_err());
        assert!(validate(Path::new("./")).is_err());
        assert!(validate(Path::new("//")).is_err());
    }

    #[rstest]
    #[case("/a/b/c", "/a/b/c")]
    #[case("/a/./b/../c", "/a/c")]
    #[case("/a/b/../../..", "/")]
    #[case("/a//b/", "/a/b")]
    #[case("a/../../b", "../b")]
    #[case("./a", "a")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), Path::new(expected));
    }

    #[rstest]
    #[case("/site/public/media/a.png", Some("a.png"))]
    #[case("/site/public/media/nested/deeper/a.png", Some("nested/deeper/a.png"))]
    #[case("/site/public/media/./nested/../a.png", Some("a.png"))]
    #[case("/site/public/media/../media/a.png", Some("a.png"))]
    #[case("/site/public/media/../a.png", None)]
    #[case("/site/public/mediafile.png", None)]
    #[case("/site/public/media-old/a.png", None)]
    #[case("/etc/passwd", None)]
    #[case("/site/public/media", None)]
    #[case("/site/public/media/", None)]
    fn test_relative_to(#[case] path: &str, #[case] expected: Option<&str>) {
        let root = Path::new("/site/public/media");
        assert_eq!(relative_to(root, path), expected.map(PathBuf::from));
    }

    #[test]
    fn test_relative_to_unnormalized_root() {
        let root = Path::new("/site/public/../public/media/");
        assert_eq!(relative_to(root, "/site/public/media/a.png"), Some(PathBuf::from("a.png")));
    }

    #[rstest]
    #[case("/media", "a.png", "/media/a.png")]
    #[case("/media", "gallery/2024/a.webp", "/media/gallery/2024/a.webp")]
    #[case("/media/", "a.png", "/media/a.png")]
    #[case("/assets/img", "a.png", "/assets/img/a.png")]
    fn test_to_public(#[case] prefix: &str, #[case] relative: &str, #[case] expected: &str) {
        assert_eq!(to_public(prefix, Path::new(relative)), expected);
    }
}

//! Glob expansion for content files and command-line path arguments.
//!
//! Patterns use [`glob`] syntax (`*`, `?`, `[...]`, `**`) plus shell-style
//! brace alternatives (`*.{md,mdx}`), which are expanded before matching.

use crate::error::{ErrorKind, Result};
use crate::path::normalize;
use exn::ResultExt;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand the first (outermost) brace group, recursively.
///
/// Unbalanced braces are left as literal text.
///
/// ```
/// use mediaopt_storage::expand_braces;
/// assert_eq!(expand_braces("*.{md,mdx}"), vec!["*.md", "*.mdx"]);
/// assert_eq!(expand_braces("{a,b}/{c,d}"), vec!["a/c", "a/d", "b/c", "b/d"]);
/// assert_eq!(expand_braces("plain"), vec!["plain"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let mut depth = 0usize;
    let mut close = None;
    let mut splits = vec![];
    for (offset, c) in pattern[open..].char_indices() {
        let index = open + offset;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            },
            ',' if depth == 1 => splits.push(index),
            _ => {},
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);
    bounds
        .windows(2)
        .flat_map(|w| expand_braces(&format!("{prefix}{}{suffix}", &pattern[w[0] + 1..w[1]])))
        .collect()
}

/// Resolve glob patterns to regular files.
///
/// Relative patterns are anchored at `base` (whose own glob metacharacters
/// are escaped). Each pattern is lexically normalized first, so
/// `public/media/../media/*.png` behaves like `public/media/*.png`. Results
/// are deduplicated across patterns and returned sorted.
///
/// Only regular files are returned; directories and symlinks are dropped.
#[instrument(level = "debug", skip_all, fields(base = %base.display()))]
pub async fn glob_files(base: &Path, patterns: &[impl AsRef<str>]) -> Result<Vec<PathBuf>> {
    let base = base.to_path_buf();
    let patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
    tokio::task::spawn_blocking(move || glob_files_blocking(&base, &patterns))
        .await
        .or_raise(|| ErrorKind::Task)?
}

fn glob_files_blocking(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let escaped_base = match base.to_str() {
        Some(s) => Pattern::escape(s),
        None => exn::bail!(ErrorKind::InvalidPath(base.to_path_buf())),
    };
    let mut found = BTreeSet::new();
    for pattern in patterns.iter().flat_map(|p| expand_braces(p)) {
        let anchored = match Path::new(&pattern).is_absolute() {
            true => normalize(&pattern),
            false => normalize(Path::new(&escaped_base).join(&pattern)),
        };
        let anchored = anchored.to_string_lossy().into_owned();
        trace!(pattern = %anchored, "expanding glob");
        let paths =
            glob::glob_with(&anchored, MATCH_OPTIONS).or_raise(|| ErrorKind::InvalidPattern(pattern.clone()))?;
        for entry in paths {
            let path = entry.or_raise(|| ErrorKind::InvalidPattern(pattern.clone()))?;
            // `symlink_metadata` so that symlinked files are skipped, not followed.
            match std::fs::symlink_metadata(&path) {
                Ok(metadata) if metadata.is_file() => {
                    found.insert(normalize(path));
                },
                Ok(_) => {},
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
                Err(e) => exn::bail!(ErrorKind::from_io(e, &path)),
            }
        }
    }
    Ok(found.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::write;
    use rstest::rstest;

    #[rstest]
    #[case("plain/path.md", vec!["plain/path.md"])]
    #[case("*.{md,mdx,json}", vec!["*.md", "*.mdx", "*.json"])]
    #[case("src/**/*.{astro,ts}", vec!["src/**/*.astro", "src/**/*.ts"])]
    #[case("{a,b}.{c,d}", vec!["a.c", "a.d", "b.c", "b.d"])]
    #[case("x{a,{b,c}}y", vec!["xay", "xby", "xcy"])]
    #[case("{single}", vec!["single"])]
    #[case("unbalanced{a,b", vec!["unbalanced{a,b"])]
    #[case("{,.min}.js", vec![".js", ".min.js"])]
    fn test_expand_braces(#[case] pattern: &str, #[case] expected: Vec<&str>) {
        assert_eq!(expand_braces(pattern), expected);
    }

    #[tokio::test]
    async fn test_glob_files_relative_patterns() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("src/content/post.md"), b"").await.unwrap();
        write(&root.join("src/content/deep/page.mdx"), b"").await.unwrap();
        write(&root.join("src/content/data.json"), b"").await.unwrap();
        write(&root.join("src/content/ignored.txt"), b"").await.unwrap();
        write(&root.join("src/pages/index.astro"), b"").await.unwrap();
        let files = glob_files(root, &["src/content/**/*.{md,mdx,json}"]).await.unwrap();
        assert_eq!(
            files,
            vec![
                root.join("src/content/data.json"),
                root.join("src/content/deep/page.mdx"),
                root.join("src/content/post.md"),
            ]
        );
    }

    #[tokio::test]
    async fn test_glob_files_deduplicates_overlapping_patterns() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("src/content/a.json"), b"").await.unwrap();
        write(&root.join("src/lib/b.ts"), b"").await.unwrap();
        let files = glob_files(root, &["src/content/**/*.json", "src/**/*.{json,ts}"]).await.unwrap();
        assert_eq!(files, vec![root.join("src/content/a.json"), root.join("src/lib/b.ts")]);
    }

    #[tokio::test]
    async fn test_glob_files_absolute_and_dotdot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("public/media/a.png"), b"").await.unwrap();
        let absolute = format!("{}/*.png", root.join("public/media").display());
        assert_eq!(glob_files(Path::new("/"), &[absolute]).await.unwrap(), vec![root.join("public/media/a.png")]);
        let dotted = glob_files(root, &["public/media/../media/a.png"]).await.unwrap();
        assert_eq!(dotted, vec![root.join("public/media/a.png")]);
    }

    #[tokio::test]
    async fn test_glob_files_skips_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(&root.join("folder.png/inner.txt"), b"").await.unwrap();
        write(&root.join("file.png"), b"").await.unwrap();
        assert_eq!(glob_files(root, &["*.png"]).await.unwrap(), vec![root.join("file.png")]);
    }

    #[tokio::test]
    async fn test_glob_files_escapes_base() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("site [draft]");
        write(&root.join("a.md"), b"").await.unwrap();
        assert_eq!(glob_files(&root, &["*.md"]).await.unwrap(), vec![root.join("a.md")]);
    }

    #[tokio::test]
    async fn test_glob_files_no_match() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(glob_files(temp_dir.path(), &["**/*.md"]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_glob_files_invalid_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = glob_files(temp_dir.path(), &["***/a"]).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPattern(_)));
    }
}

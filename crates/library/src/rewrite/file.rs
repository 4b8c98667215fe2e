use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::rewrite::error::{ErrorKind as RewriteErrorKind, Result as RewriteResult};
use exn::ResultExt;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// The one-level-up relative form of a public path.
///
/// ```
/// use mediaopt_library::rewrite::relative_form;
/// assert_eq!(relative_form("/media/a.png"), "../media/a.png");
/// assert_eq!(relative_form("../media/a.png"), "../../media/a.png");
/// ```
pub fn relative_form(path: &str) -> String {
    format!("../{}", path.trim_start_matches('/'))
}

/// Replace every occurrence of `from` with `to`, then every occurrence of the
/// relative form of `from` with the relative form of `to`.
///
/// Returns `None` when neither pattern occurs, so callers can skip the write.
///
/// ```
/// use mediaopt_library::rewrite::replace_in;
/// let md = "![a](/media/a.png) and ![b](../media/a.png)";
/// assert_eq!(replace_in(md, "/media/a.png", "/media/a.webp").unwrap(), "![a](/media/a.webp) and ![b](../media/a.webp)");
/// assert!(replace_in(md, "/media/b.png", "/media/b.webp").is_none());
/// ```
pub fn replace_in(contents: &str, from: &str, to: &str) -> Option<String> {
    let patterns = [(from.to_string(), to.to_string()), (relative_form(from), relative_form(to))];
    let mut changed = None::<String>;
    for (search, replacement) in &patterns {
        if search.is_empty() {
            continue;
        }
        let current = changed.as_deref().unwrap_or(contents);
        if current.contains(search.as_str()) {
            changed = Some(current.replace(search.as_str(), replacement));
        }
    }
    changed
}

/// Rewrite references to `from` so they point at `to` in every content file
/// matched by `globs` (relative to `root`).
///
/// Files are processed concurrently. Only files that actually changed are
/// written back, and their paths are returned. If any file fails, the others
/// still run to completion and their rewrites are kept; the first failure is
/// returned.
pub async fn rewrite_references(
    root: &Path,
    from: &str,
    to: &str,
    globs: &[impl AsRef<str>],
) -> LibraryResult<Vec<PathBuf>> {
    rewrite_references_inner(root, from, to, globs).await.or_raise(|| LibraryErrorKind::Rewrite)
}

#[instrument(skip_all, fields(root = %root.display(), from = %from, to = %to))]
pub(crate) async fn rewrite_references_inner(
    root: &Path,
    from: &str,
    to: &str,
    globs: &[impl AsRef<str>],
) -> RewriteResult<Vec<PathBuf>> {
    let files = mediaopt_storage::glob_files(root, globs).await.or_raise(|| RewriteErrorKind::Discovery)?;
    debug!(candidates = files.len(), "searching content files");
    let results = join_all(files.into_iter().map(|file| rewrite_file(file, from, to))).await;
    let mut changed = Vec::new();
    for result in results {
        if let Some(path) = result? {
            changed.push(path);
        }
    }
    if !changed.is_empty() {
        debug!(changed = changed.len(), "rewrote references");
    }
    Ok(changed)
}

async fn rewrite_file(path: PathBuf, from: &str, to: &str) -> RewriteResult<Option<PathBuf>> {
    let contents =
        mediaopt_storage::file::read_to_string(&path).await.or_raise(|| RewriteErrorKind::Read(path.clone()))?;
    let Some(rewritten) = replace_in(&contents, from, to) else {
        return Ok(None);
    };
    mediaopt_storage::file::write(&path, rewritten).await.or_raise(|| RewriteErrorKind::Write(path.clone()))?;
    debug!(path = %path.display(), "rewrote file");
    Ok(Some(path))
}

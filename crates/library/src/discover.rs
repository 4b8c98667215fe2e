use crate::Context;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::TryStreamExt;
use mediaopt_codec::ImageFormat;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Find the files a run should consider.
///
/// Explicit `targets` (paths or glob patterns) are resolved against the
/// context's working directory and may point anywhere: containment and
/// extension checks happen per file later, so that out-of-scope arguments are
/// reported rather than silently dropped. Without targets, the media root is
/// scanned for files with a supported extension.
///
/// Symlinks are never followed. The result is sorted.
#[instrument(skip_all, fields(targets = targets.len()))]
pub async fn discover(ctx: &Context, targets: &[impl AsRef<str>]) -> Result<Vec<PathBuf>> {
    if !targets.is_empty() {
        let files = mediaopt_storage::glob_files(&ctx.working_dir, targets).await.or_raise(|| ErrorKind::Discovery)?;
        debug!(count = files.len(), "expanded explicit targets");
        return Ok(files);
    }

    let mut files: Vec<PathBuf> = mediaopt_storage::walk(&ctx.media_root)
        .try_filter_map(|info| async move {
            Ok(ImageFormat::from_path(&info.path).is_some().then_some(info.path))
        })
        .try_collect()
        .await
        .or_raise(|| ErrorKind::Discovery)?;
    files.sort();
    debug!(count = files.len(), media_root = %ctx.media_root.display(), "scanned media root");
    Ok(files)
}

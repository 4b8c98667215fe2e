use crate::Context;
use crate::optimize::error::{ErrorKind as OptimizeErrorKind, Result as OptimizeResult};
use crate::optimize::outcome::{Outcome, SkipReason};
use crate::rewrite::{relative_form, rewrite_references_inner};
use exn::ResultExt;
use mediaopt_cache::{Cache, Fingerprint};
use mediaopt_codec::{Encoded, ImageFormat};
use mediaopt_storage::{file as storage, relative_to, to_public_path};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Decide what to do with a single file, and do it.
///
/// Checks run in order, the first match wins:
///
/// 1. **Unsupported extension** → [`Outcome::Skipped`], nothing read.
/// 2. **Outside the media root** (after lexical normalization, compared
///    component-wise) → [`Outcome::Skipped`], nothing read.
/// 3. **Cached** (unless forced): the stored fingerprint matches the file's
///    current size and modification time → [`Outcome::Skipped`].
/// 4. **Dry run** → [`Outcome::DryRun`], nothing written.
/// 5. Otherwise the file is re-encoded to fit the byte budget and written
///    with the codec's extension. If that changed the path, the original is
///    deleted and references in content files are rewritten before the cache
///    entry moves to the new public path.
///
/// Failures at any step become [`Outcome::Failed`]. There is no rollback: a
/// failed reference rewrite leaves the original deleted.
pub async fn process_file(ctx: &Context, cache: &mut Cache, path: &Path) -> Outcome {
    match process_file_inner(ctx, cache, path).await {
        Ok(outcome) => outcome,
        Err(error) => Outcome::Failed { path: path.to_path_buf(), error },
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
pub(crate) async fn process_file_inner(ctx: &Context, cache: &mut Cache, path: &Path) -> OptimizeResult<Outcome> {
    let skipped = |reason| Ok(Outcome::Skipped { path: path.to_path_buf(), reason });

    let Some(format) = ImageFormat::from_path(path) else {
        return skipped(SkipReason::UnsupportedExtension);
    };
    let Some(relative) = relative_to(&ctx.media_root, path) else {
        return skipped(SkipReason::OutsideMediaRoot);
    };

    let info = storage::stat(path).await.or_raise(|| OptimizeErrorKind::Storage)?;
    let public_path = to_public_path(&ctx.public_prefix, &relative);
    if !ctx.options.force && cache.is_fresh(&public_path, &Fingerprint::from(&info)) {
        return skipped(SkipReason::Cached);
    }
    if ctx.options.dry_run {
        return Ok(Outcome::DryRun { path: path.to_path_buf(), original_bytes: info.size });
    }

    let input = storage::read(path).await.or_raise(|| OptimizeErrorKind::Storage)?;
    if !format.check_magic_bytes(&input) {
        warn!(
            extension = %format,
            detected = ImageFormat::from_magic_bytes(&input).map(|f| f.as_str()).unwrap_or("unknown"),
            "file contents don't match its extension"
        );
    }
    let original_bytes = u64::try_from(input.len()).unwrap_or(u64::MAX);
    let Encoded { bytes, quality } = encode(ctx, input).await?;
    let output_bytes = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    debug!(original_bytes, output_bytes, quality, "encoded");

    let target = ctx.codec.target();
    let (output_path, output_public_path) = match format == target {
        true => (path.to_path_buf(), public_path.clone()),
        false => (
            path.with_extension(target.extension()),
            to_public_path(&ctx.public_prefix, &relative.with_extension(target.extension())),
        ),
    };
    storage::write(&output_path, &bytes).await.or_raise(|| OptimizeErrorKind::Storage)?;

    let renamed = output_path != path;
    if renamed {
        storage::delete(path).await.or_raise(|| OptimizeErrorKind::Storage)?;
        if let Err(e) = rewrite(ctx, &public_path, &output_public_path).await {
            error!(
                from = %public_path,
                to = %output_public_path,
                "original was removed but references to it could not all be rewritten"
            );
            return Err(e);
        }
    }

    let fingerprint = Fingerprint::from(&storage::stat(&output_path).await.or_raise(|| OptimizeErrorKind::Storage)?);
    match renamed {
        true => cache.relocate(&public_path, output_public_path.clone(), fingerprint),
        false => cache.record(public_path, fingerprint),
    }

    Ok(Outcome::Optimized {
        path: output_path,
        original_bytes,
        output_bytes,
        quality,
        renamed,
        public_path: output_public_path,
    })
}

/// Run the quality search on the blocking pool.
async fn encode(ctx: &Context, input: Vec<u8>) -> OptimizeResult<Encoded> {
    let codec = Arc::clone(&ctx.codec);
    let search = ctx.search;
    tokio::task::spawn_blocking(move || search.run(codec.as_ref(), &input))
        .await
        .or_raise(|| OptimizeErrorKind::Task)?
        .or_raise(|| OptimizeErrorKind::Encode)
}

/// Point content files at the renamed asset, in absolute then relative form.
async fn rewrite(ctx: &Context, from: &str, to: &str) -> OptimizeResult<()> {
    for (from, to) in [(from.to_string(), to.to_string()), (relative_form(from), relative_form(to))] {
        let changed = rewrite_references_inner(&ctx.app_root, &from, &to, &ctx.content_globs)
            .await
            .or_raise(|| OptimizeErrorKind::Rewrite)?;
        for file in changed {
            debug!(file = %file.display(), %from, %to, "updated references");
        }
    }
    Ok(())
}

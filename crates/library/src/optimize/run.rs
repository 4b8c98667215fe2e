use crate::Context;
use crate::discover::discover;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::optimize::outcome::Report;
use crate::optimize::stream::{OptimizeEvent, optimize};
use exn::ResultExt;
use futures::StreamExt;
use std::pin::pin;
use tracing::{debug, info, instrument, warn};

/// Optimize every file selected by `targets` (or the whole media root when
/// `targets` is empty).
///
/// The cache is loaded once up front and persisted once at the end, unless
/// this is a dry run. Each outcome and the final summary are logged.
///
/// # Errors
/// Only run-level failures are errors: discovery, or reading or writing the
/// cache. A file that fails to optimize is reported in the [`Report`].
#[instrument(skip_all, fields(root = %ctx.app_root.display(), force = ctx.options.force, dry_run = ctx.options.dry_run))]
pub async fn run(ctx: &Context, targets: &[impl AsRef<str>]) -> LibraryResult<Report> {
    let mut cache = ctx.cache.load().await.or_raise(|| LibraryErrorKind::Cache)?;
    let files = discover(ctx, targets).await?;
    if files.is_empty() {
        warn!("No media files found to optimize.");
        return Ok(Report::new(vec![], cache));
    }

    let mut outcomes = Vec::with_capacity(files.len());
    {
        let mut events = pin!(optimize(ctx, &mut cache, files));
        while let Some(event) = events.next().await {
            match event {
                OptimizeEvent::DiscoveryComplete(count) => debug!(count, "processing files"),
                OptimizeEvent::Processed(outcome) => {
                    outcome.log();
                    outcomes.push(outcome);
                },
                OptimizeEvent::Started | OptimizeEvent::Complete => {},
            }
        }
    }

    match ctx.options.dry_run {
        true => debug!("dry run, cache left untouched"),
        false => ctx.cache.persist(&cache).await.or_raise(|| LibraryErrorKind::Cache)?,
    }

    let report = Report::new(outcomes, cache);
    info!("Summary: {}", report.summary);
    Ok(report)
}

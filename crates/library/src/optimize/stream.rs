use crate::Context;
use crate::optimize::file::process_file;
use crate::optimize::outcome::Outcome;
use async_stream::stream;
use futures::Stream;
use mediaopt_cache::Cache;
use std::path::PathBuf;

/// Progress events emitted by [`optimize`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once, with the
///    number of files that will be processed.
/// 3. [`Processed`](Self::Processed), once per file, in input order.
/// 4. [`Complete`](Self::Complete), exactly once.
#[derive(Debug)]
pub enum OptimizeEvent {
    Started,
    DiscoveryComplete(u64),
    Processed(Outcome),
    Complete,
}

/// Streams an [`OptimizeEvent`] for every file in `files`, processing them
/// strictly one after another and updating `cache` as it goes.
///
/// Per-file failures are reported as [`Outcome::Failed`], so the stream
/// itself never fails. Persisting the cache is left to the caller.
pub fn optimize<'a>(ctx: &'a Context, cache: &'a mut Cache, files: Vec<PathBuf>) -> impl Stream<Item = OptimizeEvent> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield OptimizeEvent::Started;
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield OptimizeEvent::DiscoveryComplete(u64::try_from(files.len()).unwrap_or(u64::MAX));
        for file in files {
            yield OptimizeEvent::Processed(process_file(ctx, cache, &file).await);
        }
        yield OptimizeEvent::Complete;
    })
}

//! Recursive directory listing as an async stream.

use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use async_stream::stream;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::{self, DirEntry};

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Stream metadata for every regular file beneath `root`, depth-first.
///
/// Symlinks (to files or directories) are never followed or yielded. A root
/// that doesn't exist produces an empty stream rather than an error; an
/// unreadable directory yields an error item and the walk carries on.
///
/// # Examples
///
/// ```no_run
/// use futures::TryStreamExt;
/// use std::path::Path;
/// # async fn example() -> mediaopt_storage::error::Result<()> {
/// let mut stream = mediaopt_storage::walk(Path::new("/site/public/media"));
/// while let Some(info) = stream.try_next().await? {
///     println!("{}: {} bytes", info.path.display(), info.size);
/// }
/// # Ok(())
/// # }
/// ```
pub fn walk<'a>(root: &'a Path) -> FileInfoStream<'a> {
    let mut stack = vec![root.to_path_buf()];
    Box::pin(stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(err, &current)));
                    continue 'dirs;
                }
            };

            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(e) => { yield Err(exn::Exn::from(ErrorKind::from_io(e, &current))); continue 'entries; },
                };
                match process_entry(entry).await {
                    Ok(WalkEntry::File(f)) => yield Ok(f),
                    Ok(WalkEntry::Descend(d)) => stack.push(d),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                };
            }
        }
    })
}

/// Collect [`walk()`] into a [`Vec`], failing on the first error.
pub async fn list(root: &Path) -> Result<Vec<FileInfo>> {
    walk(root).try_collect().await
}

async fn process_entry(entry: DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    // `DirEntry::file_type` doesn't traverse symlinks.
    let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if file_type.is_file() {
        let metadata = entry.metadata().await.map_err(|e| ErrorKind::from_io(e, &path))?;
        return Ok(WalkEntry::File(FileInfo::from_metadata(&path, &metadata)?));
    }
    Ok(WalkEntry::Skip)
}

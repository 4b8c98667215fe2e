//! Filesystem access for mediaopt.
//!
//! Everything that touches the disk goes through here: whole-file reads and
//! writes ([`file`]), recursive listing of the media root ([`walk()`]), glob
//! expansion for content files and path arguments ([`glob_files()`]), and the
//! lexical containment checks that keep processing inside the media root
//! ([`relative_to()`]).

pub mod error;
pub mod file;
mod globs;
mod path;
mod walk;

pub use crate::file::FileInfo;
pub use crate::globs::{expand_braces, glob_files};
pub use crate::path::{normalize as normalize_path, relative_to, to_public as to_public_path, validate as validate_path};
pub use crate::walk::{FileInfoStream, list, walk};

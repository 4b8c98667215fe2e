//! Reference rewriting in content files.
//!
//! When an asset is renamed (`/media/a.png` becomes `/media/a.webp`), every
//! content file matching the configured glob patterns is searched for the old
//! public path and rewritten in place. Matching is a literal substring search:
//! there is no parsing of Markdown, JSX or JSON, and no word-boundary check.
//!
//! Both the absolute form (`/media/a.png`) and the one-level-relative form
//! (`../media/a.png`) are replaced.

pub mod error;
mod file;

pub(crate) use self::file::rewrite_references_inner;
pub use self::file::{relative_form, replace_in, rewrite_references};

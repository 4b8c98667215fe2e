//! The per-file optimization state machine and the run loop around it.
//!
//! Every discovered file ends up in exactly one state:
//!
//! ```text
//! discovered ─┬─> skipped (unsupported-extension)
//!             ├─> skipped (outside-media-root)
//!             ├─> skipped (cached)
//!             ├─> dry-run
//!             ├─> optimized
//!             └─> failed
//! ```
//!
//! [`process_file`] decides the state of one file, [`optimize`] streams
//! [`OptimizeEvent`]s over a list of files, and [`run`] wires discovery, the
//! cache and logging around the stream.

pub mod error;
mod file;
mod outcome;
mod run;
mod stream;

pub use self::file::process_file;
pub use self::outcome::{Outcome, Report, SkipReason, Summary};
pub use self::run::run;
pub use self::stream::{OptimizeEvent, optimize};

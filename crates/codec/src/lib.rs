//! Lossy image re-encoding with a byte budget.
//!
//! This crate wraps an image decoder and a lossy encoder behind the [`Codec`]
//! trait, providing:
//!
//! - **Format detection** from file extensions ([`ImageFormat::from_path`]) or
//!   magic bytes ([`ImageFormat::from_magic_bytes`])
//! - **Re-encoding** of raw image bytes at a given quality ([`WebpCodec`])
//! - **Quality search** that walks the quality down in fixed steps until the
//!   output fits a byte budget ([`Search`])
//!
//! Codecs are pure: the same input and quality always produce the same output
//! and nothing touches the filesystem. Encoding is CPU-bound, so async callers
//! should run it on a blocking thread.

pub mod error;
mod format;
mod search;
mod webp;

pub use crate::search::{DEFAULT_MAX_BYTES, DEFAULT_MIN_QUALITY, DEFAULT_QUALITY, DEFAULT_STEP, Encoded, Search};
pub use crate::webp::WebpCodec;
use crate::error::Result;
use std::sync::Arc;

/// Shared handle to a codec, cheap to clone into blocking tasks.
pub type CodecHandle = Arc<dyn Codec + Send + Sync>;

/// A supported raster image format.
///
/// The variants are exactly the extensions that are considered for
/// optimization; anything else is skipped before any bytes are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics (.png)
    Png,
    /// JPEG (.jpg, .jpeg)
    Jpeg,
    /// WebP (.webp)
    WebP,
    /// AV1 Image File Format (.avif)
    Avif,
}

/// Re-encodes raw image bytes into a single target format.
pub trait Codec {
    /// The format every successful [`encode()`](Self::encode) produces.
    fn target(&self) -> ImageFormat;

    /// Decode `input` and re-encode it at `quality` (0-100, higher is better).
    ///
    /// Returns [`Decode`](crate::error::ErrorKind::Decode) when `input` isn't
    /// a decodable image, or [`Encode`](crate::error::ErrorKind::Encode) when
    /// the encoder rejects it.
    fn encode(&self, input: &[u8], quality: u8) -> Result<Vec<u8>>;
}

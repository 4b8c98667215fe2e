use crate::ImageFormat;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::{path::Path, str::FromStr};

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WEBP_MAGIC: &[u8; 4] = b"WEBP";
const AVIF_BRANDS: [&[u8; 8]; 2] = [b"ftypavif", b"ftypavis"];

impl FromStr for ImageFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::WebP),
            "avif" => Ok(ImageFormat::Avif),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(s.to_string())),
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for ImageFormat {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl ImageFormat {
    /// Detect the image format from a file extension.
    ///
    /// Returns `None` for anything outside the supported set, which is the
    /// signal for callers to skip the file entirely.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|ext| ext.to_str()).and_then(|ext| ext.parse().ok())
    }

    /// Detect the image format from magic bytes.
    ///
    /// Returns `None` if no signature matches or the input is too short.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_MAGIC) {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(&JPEG_MAGIC) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.len() >= 12 && &bytes[0..4] == RIFF_MAGIC && &bytes[8..12] == WEBP_MAGIC {
            return Some(ImageFormat::WebP);
        }
        if bytes.len() >= 12 && AVIF_BRANDS.iter().any(|brand| &bytes[4..12] == *brand) {
            return Some(ImageFormat::Avif);
        }
        None
    }

    /// Returns the canonical file extension (without the leading dot).
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::WebP => "webp",
            ImageFormat::Avif => "avif",
        }
    }

    /// Returns the short name (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::WebP => "webp",
            ImageFormat::Avif => "avif",
        }
    }

    /// Verify that `bytes` start with the expected signature for this format.
    ///
    /// Useful for cross-checking a format detected from a file extension
    /// against the actual file contents.
    #[must_use]
    pub fn check_magic_bytes(&self, bytes: &[u8]) -> bool {
        Self::from_magic_bytes(bytes) == Some(*self)
    }
}

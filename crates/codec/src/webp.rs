//! Lossy WebP encoding via `libwebp`.

use crate::error::{ErrorKind, Result};
use crate::{Codec, ImageFormat};
use exn::ResultExt;
use image::DynamicImage;
use tracing::instrument;
use ::webp::Encoder;

/// Decodes PNG, JPEG or WebP input and re-encodes it as lossy WebP.
///
/// # Examples
///
/// ```no_run
/// use mediaopt_codec::{Codec, WebpCodec};
///
/// let png = std::fs::read("public/media/sample.png").unwrap();
/// let webp = WebpCodec.encode(&png, 80).unwrap();
/// assert!(webp.starts_with(b"RIFF"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct WebpCodec;

impl WebpCodec {
    fn decode(input: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(input).or_raise(|| ErrorKind::Decode)
    }
}

impl Codec for WebpCodec {
    fn target(&self) -> ImageFormat {
        ImageFormat::WebP
    }

    #[instrument(level = "trace", skip(self, input), fields(bytes = input.len()))]
    fn encode(&self, input: &[u8], quality: u8) -> Result<Vec<u8>> {
        let decoded = Self::decode(input)?;
        let (width, height) = (decoded.width(), decoded.height());
        let quality = f32::from(quality.min(100));
        // libwebp only understands 8-bit RGB(A); anything else (16-bit PNGs,
        // greyscale, ...) is flattened first.
        let encoded = if decoded.color().has_alpha() {
            let pixels = decoded.to_rgba8();
            Encoder::from_rgba(pixels.as_raw(), width, height).encode_simple(false, quality)
        } else {
            let pixels = decoded.to_rgb8();
            Encoder::from_rgb(pixels.as_raw(), width, height).encode_simple(false, quality)
        };
        match encoded {
            Ok(memory) => Ok(memory.to_vec()),
            Err(e) => exn::bail!(ErrorKind::Encode(format!("{e:?}"))),
        }
    }
}

//! Budget-driven quality search.

use crate::Codec;
use crate::error::{Error, ErrorKind, Result};
use tracing::{debug, instrument};

/// Default starting quality.
pub const DEFAULT_QUALITY: u8 = 80;
/// Default lowest quality the search will attempt.
pub const DEFAULT_MIN_QUALITY: u8 = 40;
/// Default amount the quality drops between attempts.
pub const DEFAULT_STEP: u8 = 5;
/// Default output budget (2 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024;

/// The buffer a [`Search`] settled on, and the quality that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub quality: u8,
}

/// Finds the highest quality (on a fixed-step ladder) whose output fits the
/// byte budget.
///
/// Starting at [`start`](Self::start), each attempt encodes the whole input.
/// The first output that fits within [`max_bytes`](Self::max_bytes) wins
/// immediately; otherwise the quality drops by [`step`](Self::step) until it
/// would fall below [`floor`](Self::floor).
///
/// This is a greedy linear descent, not a binary search: the chosen quality
/// is always `start - n * step` for some `n`, even if a quality between two
/// rungs would also have fit.
///
/// When nothing fits, the smallest buffer produced (the last rung attempted)
/// is returned anyway. The budget is a target, not a guarantee.
///
/// # Examples
///
/// ```no_run
/// use mediaopt_codec::{Search, WebpCodec};
///
/// let png = std::fs::read("public/media/sample.png").unwrap();
/// let encoded = Search::default().run(&WebpCodec, &png).unwrap();
/// println!("{} bytes at q={}", encoded.bytes.len(), encoded.quality);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Search {
    pub start: u8,
    pub floor: u8,
    pub step: u8,
    pub max_bytes: u64,
}
impl Default for Search {
    fn default() -> Self {
        Self {
            start: DEFAULT_QUALITY,
            floor: DEFAULT_MIN_QUALITY,
            step: DEFAULT_STEP,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl Search {
    /// Run the search against `input` using `codec`.
    ///
    /// # Errors
    /// - The error from the very first attempt, if it failed (a decode error
    ///   won't get better at a lower quality).
    /// - [`ErrorKind::Exhausted`] if no attempt was made at all (e.g. the
    ///   floor is above the starting quality).
    #[instrument(level = "debug", skip_all, fields(input = input.len(), max_bytes = self.max_bytes))]
    pub fn run<C: Codec + ?Sized>(&self, codec: &C, input: &[u8]) -> Result<Encoded> {
        let mut quality = Some(self.start);
        let mut best: Option<Encoded> = None;
        let mut last_error: Option<Error> = None;

        while let Some(q) = quality.filter(|q| *q >= self.floor) {
            let bytes = match codec.encode(input, q) {
                Ok(bytes) => bytes,
                Err(e) => {
                    last_error = Some(e);
                    break;
                },
            };
            let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
            if size <= self.max_bytes {
                debug!(quality = q, size, "output fits budget");
                return Ok(Encoded { bytes, quality: q });
            }
            debug!(quality = q, size, "output over budget");
            best = Some(Encoded { bytes, quality: q });
            // A zero step would never terminate; treat it as a single attempt.
            quality = match self.step {
                0 => None,
                step => q.checked_sub(step),
            };
        }

        match (best, last_error) {
            (Some(encoded), last_error) => {
                if let Some(e) = last_error {
                    debug!(error = ?e, quality = encoded.quality, "encoder failed mid-search; keeping previous output");
                }
                Ok(encoded)
            },
            (None, Some(e)) => Err(e),
            (None, None) => exn::bail!(ErrorKind::Exhausted),
        }
    }
}

//! Payload compression
//!
//! Bodies larger than the plaintext limit may be compressed before
//! encryption. Compression is an injected collaborator, like the crypto
//! provider, so callers can plug in a stronger codec.

use crate::error::{CompressionError, Result};

/// Lossless byte compressor
pub trait Compressor: Send + Sync {
    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Compress `data`
    fn compress(&self, data: &[u8]) -> Vec<u8>;

    /// Reverse [`compress`](Self::compress)
    ///
    /// # Errors
    ///
    /// `CompressionError::Corrupted` if `data` was not produced by this
    /// compressor.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Maximum run length encoded in a single pair
const MAX_RUN: usize = u8::MAX as usize;

/// Byte-level run-length encoding
///
/// Output is a sequence of `(count, byte)` pairs with `count` in `1..=255`.
/// Effective on repetitive text; doubles the size of input without runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthCompressor;

impl RunLengthCompressor {
    /// Create a run-length compressor
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for RunLengthCompressor {
    fn name(&self) -> &'static str {
        "RunLength"
    }

    fn compress(&self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut iter = data.iter().copied().peekable();

        while let Some(byte) = iter.next() {
            let mut run = 1;
            while run < MAX_RUN && iter.peek() == Some(&byte) {
                iter.next();
                run += 1;
            }
            out.push(run as u8);
            out.push(byte);
        }

        out
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() % 2 != 0 {
            return Err(CompressionError::Corrupted {
                reason: format!("odd length {}", data.len()),
            }
            .into());
        }

        let mut out = Vec::with_capacity(data.len());
        for (i, pair) in data.chunks_exact(2).enumerate() {
            let (count, byte) = (pair[0], pair[1]);
            if count == 0 {
                return Err(CompressionError::Corrupted {
                    reason: format!("zero-length run at pair {}", i),
                }
                .into());
            }
            out.extend(std::iter::repeat(byte).take(count as usize));
        }

        Ok(out)
    }
}

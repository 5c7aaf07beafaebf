//! Payload compression for frame bodies.
//!
//! Uses zlib (DEFLATE with a zlib wrapper) so that more payload fits in the
//! same carrier. Whether a body is compressed is recorded in the frame flag,
//! never guessed from the data.

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::io::Read;

use super::frame::MAX_BODY_LEN;
use crate::error::StegoError;

/// Highest accepted compression level.
pub const MAX_LEVEL: u8 = 9;

/// Compresses `data` at `level` (1 = fastest, 9 = smallest).
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>, StegoError> {
    if level == 0 || level > MAX_LEVEL {
        return Err(StegoError::invalid(
            "compression_level",
            level,
            format!("must be between 1 and {MAX_LEVEL} to compress"),
        ));
    }

    let mut encoder = ZlibEncoder::new(data, Compression::new(level as u32));
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| StegoError::Compression(e.to_string()))?;

    Ok(compressed)
}

/// Decompresses a body produced by [`compress`].
///
/// Output is capped at [`MAX_BODY_LEN`], the largest payload a frame can
/// describe.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, StegoError> {
    decompress_bounded(data, MAX_BODY_LEN)
}

fn decompress_bounded(data: &[u8], limit: usize) -> Result<Vec<u8>, StegoError> {
    let mut decoder = ZlibDecoder::new(data).take(limit as u64 + 1);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| StegoError::Compression(format!("decompression failed: {e}")))?;

    if decompressed.len() > limit {
        return Err(StegoError::Compression(format!(
            "decompressed body exceeds {limit} bytes"
        )));
    }
    Ok(decompressed)
}

/// Returns compression ratio (compressed_size / original_size).
/// Values < 1.0 mean compression helped.
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> f64 {
    if original_len == 0 {
        return 1.0;
    }
    compressed_len as f64 / original_len as f64
}

//! Self-describing payload frames.
//!
//! ```text
//! [31 bits] body length in bytes (big-endian, upper bits of the header word)
//! [ 1 bit ] compression flag (low bit of the header word)
//! [N bytes] body, zlib-compressed when the flag is set
//! ```
//!
//! The header is one 32-bit word, so the frame overhead is
//! [`FRAME_HEADER_BYTES`] and recovery never needs the payload size.

use tracing::debug;

use super::bits::BitReader;
use super::compression;
use crate::error::StegoError;

/// Size of the header word in bytes.
pub const FRAME_HEADER_BYTES: usize = 4;

/// Largest body the 31-bit length field can describe.
pub const MAX_BODY_LEN: usize = (u32::MAX >> 1) as usize;

/// Parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub body_len: usize,
    pub compressed: bool,
}

impl FrameHeader {
    pub fn to_bytes(self) -> Result<[u8; FRAME_HEADER_BYTES], StegoError> {
        if self.body_len > MAX_BODY_LEN {
            return Err(StegoError::invalid(
                "payload",
                format!("{} bytes", self.body_len),
                format!("frames hold at most {MAX_BODY_LEN} bytes"),
            ));
        }
        let word = ((self.body_len as u32) << 1) | self.compressed as u32;
        Ok(word.to_be_bytes())
    }

    pub fn from_bytes(bytes: [u8; FRAME_HEADER_BYTES]) -> Self {
        let word = u32::from_be_bytes(bytes);
        Self {
            body_len: (word >> 1) as usize,
            compressed: word & 1 == 1,
        }
    }
}

/// A payload wrapped for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    compressed: bool,
    body: Vec<u8>,
}

impl Frame {
    /// Wraps `payload`, compressing it first when `compression_level > 0`.
    ///
    /// The compressed form is only kept if it is actually smaller.
    pub fn seal(payload: &[u8], compression_level: u8) -> Result<Self, StegoError> {
        if compression_level > 0 {
            let compressed = compression::compress(payload, compression_level)?;
            debug!(
                original = payload.len(),
                compressed = compressed.len(),
                ratio = compression::compression_ratio(payload.len(), compressed.len()),
                level = compression_level,
                "compressed payload"
            );
            if compressed.len() < payload.len() {
                return Ok(Self {
                    compressed: true,
                    body: compressed,
                });
            }
        }

        Ok(Self {
            compressed: false,
            body: payload.to_vec(),
        })
    }

    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            body_len: self.body.len(),
            compressed: self.compressed,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Header plus body, in bytes.
    pub fn framed_len(&self) -> usize {
        FRAME_HEADER_BYTES + self.body.len()
    }

    /// Serializes header and body into one byte string.
    pub fn encode(&self) -> Result<Vec<u8>, StegoError> {
        let mut out = Vec::with_capacity(self.framed_len());
        out.extend_from_slice(&self.header().to_bytes()?);
        out.extend_from_slice(&self.body);
        Ok(out)
    }

    /// Parses a frame from the front of a bit stream.
    ///
    /// Fails with [`StegoError::CorruptFrame`] if the length field asks for
    /// more bytes than the stream can still supply.
    pub fn decode<I>(reader: &mut BitReader<I>) -> Result<Self, StegoError>
    where
        I: ExactSizeIterator<Item = u8>,
    {
        let raw = reader
            .read_bytes(FRAME_HEADER_BYTES)
            .ok_or_else(|| {
                StegoError::CorruptFrame(format!(
                    "carrier holds {} bits, fewer than the {}-byte frame header",
                    reader.remaining_bits(),
                    FRAME_HEADER_BYTES
                ))
            })?;
        let mut header_bytes = [0u8; FRAME_HEADER_BYTES];
        header_bytes.copy_from_slice(&raw);
        let header = FrameHeader::from_bytes(header_bytes);

        let available = reader.remaining_bits() / 8;
        if header.body_len > available {
            return Err(StegoError::CorruptFrame(format!(
                "length field says {} bytes but only {} remain in the carrier",
                header.body_len, available
            )));
        }

        let body = reader.read_bytes(header.body_len).ok_or_else(|| {
            StegoError::CorruptFrame(format!("body of {} bytes truncated", header.body_len))
        })?;

        Ok(Self {
            compressed: header.compressed,
            body,
        })
    }

    /// Unwraps the payload, decompressing when the flag is set.
    pub fn open(self) -> Result<Vec<u8>, StegoError> {
        if self.compressed {
            compression::decompress(&self.body)
        } else {
            Ok(self.body)
        }
    }
}

//! Bit packing, payload framing and compression shared by both engines.

pub mod bits;
pub mod compression;
pub mod frame;

pub use bits::{bits_of, embed_bytes, pack_bits, read_low_bits, write_low_bits, BitReader, LsbCount};
pub use frame::{Frame, FrameHeader, FRAME_HEADER_BYTES, MAX_BODY_LEN};

//! Capacity planning.
//!
//! A carrier of `U` units at `n` LSBs per unit holds `U * n` bits. The
//! payload budget is that, rounded down to whole bytes, minus whatever
//! header the engine writes in front of the body.

use crate::codec::LsbCount;
use crate::error::StegoError;

/// How much a carrier can hold at one bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    /// Modifiable 8-bit units in the carrier.
    pub carrier_units: usize,
    pub lsb_count: u8,
    /// `carrier_units * lsb_count`.
    pub capacity_bits: usize,
    /// Bytes of framing written before the body.
    pub frame_header_bytes: usize,
    /// Largest body (after optional compression) that fits.
    pub capacity_bytes: usize,
}

impl CapacityReport {
    pub fn plan(carrier_units: usize, lsb: LsbCount, frame_header_bytes: usize) -> Self {
        let capacity_bits = carrier_units * lsb.get() as usize;
        Self {
            carrier_units,
            lsb_count: lsb.get(),
            capacity_bits,
            frame_header_bytes,
            capacity_bytes: (capacity_bits / 8).saturating_sub(frame_header_bytes),
        }
    }

    pub fn fits(&self, body_len: usize) -> bool {
        body_len <= self.capacity_bytes && self.frame_header_bytes * 8 <= self.capacity_bits
    }

    /// Refuses a body that does not fit. Nothing is truncated.
    pub fn check(&self, body_len: usize) -> Result<(), StegoError> {
        if self.fits(body_len) {
            Ok(())
        } else {
            Err(StegoError::CapacityExceeded {
                needed_bytes: self.frame_header_bytes + body_len,
                capacity_bytes: self.capacity_bytes,
                capacity_bits: self.capacity_bits,
                lsb_count: self.lsb_count,
            })
        }
    }
}

/// Result of checking a specific payload against a carrier.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadAnalysis {
    pub capacity: CapacityReport,
    /// Payload size as supplied.
    pub payload_bytes: usize,
    /// Size that would actually be embedded, after compression.
    pub body_bytes: usize,
    pub compressed: bool,
    pub fits: bool,
}

impl PayloadAnalysis {
    /// Fraction of the payload budget the body would use.
    pub fn usage(&self) -> f64 {
        if self.capacity.capacity_bytes == 0 {
            return f64::INFINITY;
        }
        self.body_bytes as f64 / self.capacity.capacity_bytes as f64
    }
}

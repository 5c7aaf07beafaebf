//! Bit-level packing between payload bytes and 8-bit carrier units.
//!
//! Payload bytes are read most-significant bit first. Bits are grouped
//! `n` at a time (1..=8) and each group replaces the low `n` bits of one
//! carrier unit. [`BitReader`] performs the inverse walk.
//!
//! Everything here rests on one identity:
//!
//! ```text
//! read_low_bits(write_low_bits(u, v, n), n) == v & ((1 << n) - 1)
//! ```

use crate::error::StegoError;

/// Number of low bits of each carrier unit used for embedding, in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LsbCount(u8);

impl LsbCount {
    /// Smallest accepted bit depth.
    pub const MIN: u8 = 1;
    /// Largest accepted bit depth (the whole unit).
    pub const MAX: u8 = 8;

    /// Validates `n` and wraps it.
    pub fn new(n: u8) -> Result<Self, StegoError> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(StegoError::invalid(
                "lsb_count",
                n,
                format!("must be between {} and {}", Self::MIN, Self::MAX),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Mask selecting the low `n` bits of a unit.
    pub fn mask(self) -> u8 {
        ((1u16 << self.0) - 1) as u8
    }

    /// Carrier units needed to hold `byte_len` bytes.
    pub fn units_for(self, byte_len: usize) -> usize {
        (byte_len * 8).div_ceil(self.0 as usize)
    }
}

impl TryFrom<u8> for LsbCount {
    type Error = StegoError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<LsbCount> for u8 {
    fn from(n: LsbCount) -> u8 {
        n.0
    }
}

/// Bits of `bytes`, most-significant bit first within each byte.
///
/// The returned iterator is cheap to clone, so the same sequence can be
/// walked again from the start.
pub fn bits_of(bytes: &[u8]) -> impl Iterator<Item = bool> + Clone + '_ {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
}

/// Groups a bit sequence into integers of `width` bits each.
///
/// The final group is zero-padded on the right when the bit count is not a
/// multiple of `width`.
pub fn pack_bits<I>(bits: I, width: LsbCount) -> PackBits<I::IntoIter>
where
    I: IntoIterator<Item = bool>,
{
    PackBits {
        bits: bits.into_iter(),
        width: width.get(),
    }
}

/// Iterator returned by [`pack_bits`].
#[derive(Debug, Clone)]
pub struct PackBits<I> {
    bits: I,
    width: u8,
}

impl<I: Iterator<Item = bool>> Iterator for PackBits<I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let mut value = 0u8;
        let mut taken = 0u8;
        while taken < self.width {
            match self.bits.next() {
                Some(bit) => {
                    value = (value << 1) | bit as u8;
                    taken += 1;
                }
                None => break,
            }
        }

        if taken == 0 {
            return None;
        }
        Some(value << (self.width - taken))
    }
}

/// Replaces the low `n` bits of `unit` with the low `n` bits of `value`.
#[inline]
pub fn write_low_bits(unit: u8, value: u8, n: LsbCount) -> u8 {
    let mask = n.mask();
    (unit & !mask) | (value & mask)
}

/// Reads the low `n` bits of `unit`.
#[inline]
pub fn read_low_bits(unit: u8, n: LsbCount) -> u8 {
    unit & n.mask()
}

/// Writes `data` into the low bits of successive `units`.
///
/// Returns how many units were modified. Units past the end of the data are
/// left untouched. The caller is responsible for checking capacity first:
/// bits that do not fit are dropped.
pub fn embed_bytes<'a, U>(units: U, data: &[u8], n: LsbCount) -> usize
where
    U: IntoIterator<Item = &'a mut u8>,
{
    let mut touched = 0;
    for (unit, group) in units.into_iter().zip(pack_bits(bits_of(data), n)) {
        *unit = write_low_bits(*unit, group, n);
        touched += 1;
    }
    touched
}

/// Reassembles bytes from the low bits of a sequence of carrier units.
///
/// Keeps leftover bits between calls, so a frame header and its body can be
/// read back to back even when a unit straddles the boundary.
#[derive(Debug)]
pub struct BitReader<I> {
    units: I,
    n: LsbCount,
    acc: u32,
    acc_bits: u8,
}

impl<I> BitReader<I>
where
    I: ExactSizeIterator<Item = u8>,
{
    pub fn new(units: I, n: LsbCount) -> Self {
        Self {
            units,
            n,
            acc: 0,
            acc_bits: 0,
        }
    }

    /// Bits still available from the remaining units.
    pub fn remaining_bits(&self) -> usize {
        self.acc_bits as usize + self.units.len() * self.n.get() as usize
    }

    /// Reads one byte, or `None` once the units run out.
    pub fn read_byte(&mut self) -> Option<u8> {
        while self.acc_bits < 8 {
            let unit = self.units.next()?;
            self.acc = (self.acc << self.n.get()) | read_low_bits(unit, self.n) as u32;
            self.acc_bits += self.n.get();
        }

        self.acc_bits -= 8;
        let byte = (self.acc >> self.acc_bits) as u8;
        self.acc &= (1u32 << self.acc_bits) - 1;
        Some(byte)
    }

    /// Reads exactly `count` bytes, or `None` if fewer are available.
    pub fn read_bytes(&mut self, count: usize) -> Option<Vec<u8>> {
        if count * 8 > self.remaining_bits() {
            return None;
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_byte()?);
        }
        Some(out)
    }
}

//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// Maximum number of bits a single [`BitReader::read_bits`] call may consume.
pub const MAX_READ_BITS: u8 = 32;

/// A cursor over a captured packet buffer.
///
/// The reader tracks a byte offset and a bit offset within the current byte.
/// Bit reads consume MSB-first. Byte-level reads (`read_u8`, `read_u32`, ...)
/// require the cursor to sit on a byte boundary; after a run of bit reads the
/// caller must flush with [`align_to_byte`](Self::align_to_byte) or the read
/// fails with [`BitError::Unaligned`].
///
/// All reads are bounds-checked and the reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Returns the total length of the underlying buffer in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns the number of whole bytes remaining after the current byte offset.
    #[must_use]
    pub const fn bytes_remaining(&self) -> usize {
        self.bits_remaining() / 8
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the absolute bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the byte offset of the current byte.
    #[must_use]
    pub const fn byte_position(&self) -> usize {
        self.bit_pos / 8
    }

    /// Returns the bit offset within the current byte, in `0..8`.
    #[must_use]
    pub const fn bit_offset(&self) -> u8 {
        (self.bit_pos % 8) as u8
    }

    /// Returns `true` if the cursor sits on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        if self.bits_remaining() == 0 {
            return Err(BitError::OutOfRange {
                requested: 1,
                available: 0,
            });
        }
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> (7 - bit_idx)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 32 bits MSB-first as an unsigned integer.
    ///
    /// Reading zero bits is a no-op that returns `0`.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u32> {
        if bits > MAX_READ_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_READ_BITS,
            });
        }
        if bits == 0 {
            return Ok(0);
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Discards the unread bits of the current byte.
    ///
    /// A no-op when the cursor is already aligned.
    pub fn align_to_byte(&mut self) {
        let rem = self.bit_pos % 8;
        if rem != 0 {
            self.bit_pos += 8 - rem;
        }
    }

    /// Reads a byte-aligned `u8`.
    pub fn read_u8(&mut self) -> BitResult<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Reads a byte-aligned `i8`.
    pub fn read_i8(&mut self) -> BitResult<i8> {
        Ok(i8::from_le_bytes(self.read_array::<1>()?))
    }

    /// Reads a byte-aligned `u16` (little-endian).
    pub fn read_u16(&mut self) -> BitResult<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a byte-aligned `i16` (little-endian).
    pub fn read_i16(&mut self) -> BitResult<i16> {
        Ok(i16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Reads a byte-aligned `u32` (little-endian).
    pub fn read_u32(&mut self) -> BitResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a byte-aligned `i32` (little-endian).
    pub fn read_i32(&mut self) -> BitResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a byte-aligned `u64` (little-endian).
    pub fn read_u64(&mut self) -> BitResult<u64> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a byte-aligned `i64` (little-endian).
    pub fn read_i64(&mut self) -> BitResult<i64> {
        Ok(i64::from_le_bytes(self.read_array::<8>()?))
    }

    /// Reads a byte-aligned IEEE-754 `f32` (little-endian).
    pub fn read_f32(&mut self) -> BitResult<f32> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads `len` raw bytes, borrowing them from the underlying buffer.
    pub fn read_bytes(&mut self, len: usize) -> BitResult<&'a [u8]> {
        self.ensure_aligned()?;
        self.ensure_bits(len.saturating_mul(8))?;
        let idx = self.bit_pos / 8;
        let bytes = &self.data[idx..idx + len];
        self.bit_pos += len * 8;
        Ok(bytes)
    }

    /// Reads a fixed-length byte run as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected; captured
    /// strings are diagnostic data, not protocol structure.
    pub fn read_string(&mut self, len: usize) -> BitResult<String> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn ensure_aligned(&self) -> BitResult<()> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::Unaligned {
                bit_position: self.bit_pos,
            });
        }
        Ok(())
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::OutOfRange {
                requested: bits,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        self.ensure_aligned()?;
        self.ensure_bits(N * 8)?;
        let idx = self.bit_pos / 8;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[idx..idx + N]);
        self.bit_pos += N * 8;
        Ok(out)
    }
}

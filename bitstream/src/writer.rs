//! Bit-level writer used to assemble identifier payloads and test buffers.

use crate::error::{BitError, BitResult};

/// A bit-level writer mirroring [`BitReader`](crate::BitReader).
///
/// Bits are packed MSB-first. Byte-level writes require alignment, exactly
/// like their read counterparts, so a buffer written with the same sequence
/// of calls reads back field-for-field.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// The completed bytes.
    bytes: Vec<u8>,
    /// Current byte being written (not yet pushed to bytes).
    current_byte: u8,
    /// Number of bits written to `current_byte` (0-7).
    bit_count: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Returns `true` if the writer sits on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        self.current_byte = (self.current_byte << 1) | u8::from(value);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes up to 32 bits MSB-first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 32`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u32, bits: u8) -> BitResult<()> {
        if bits > 32 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 32 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 32 && value >= (1u32 << bits) {
            return Err(BitError::ValueOutOfRange {
                value: u64::from(value),
                bits,
            });
        }

        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Pads the current byte with zero bits.
    pub fn align_to_byte(&mut self) {
        if self.bit_count > 0 {
            self.current_byte <<= 8 - self.bit_count;
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes raw bytes at a byte boundary.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> BitResult<()> {
        if self.bit_count != 0 {
            return Err(BitError::Unaligned {
                bit_position: self.bits_written(),
            });
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Writes a byte-aligned `u8`.
    pub fn write_u8(&mut self, value: u8) -> BitResult<()> {
        self.write_bytes(&[value])
    }

    /// Writes a byte-aligned `i8`.
    pub fn write_i8(&mut self, value: i8) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `u16` (little-endian).
    pub fn write_u16(&mut self, value: u16) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `i16` (little-endian).
    pub fn write_i16(&mut self, value: i16) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `u32` (little-endian).
    pub fn write_u32(&mut self, value: u32) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `i32` (little-endian).
    pub fn write_i32(&mut self, value: i32) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `u64` (little-endian).
    pub fn write_u64(&mut self, value: u64) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `i64` (little-endian).
    pub fn write_i64(&mut self, value: i64) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a byte-aligned `f32` (little-endian).
    pub fn write_f32(&mut self, value: f32) -> BitResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, it is padded with zeros on the right.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = BitWriter::new();
        assert_eq!(writer.bits_written(), 0);
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn write_single_bit_true() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        assert_eq!(writer.bits_written(), 1);
        // Single bit 1, padded with 7 zeros
        assert_eq!(writer.finish(), vec![0b1000_0000]);
    }

    #[test]
    fn write_bits_msb_first() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        assert_eq!(writer.finish(), vec![0b1011_1000]);
    }

    #[test]
    fn write_bits_rejects_overflow() {
        let mut writer = BitWriter::new();
        assert_eq!(
            writer.write_bits(8, 3).unwrap_err(),
            BitError::ValueOutOfRange { value: 8, bits: 3 }
        );
        assert_eq!(
            writer.write_bits(0, 33).unwrap_err(),
            BitError::InvalidBitCount {
                bits: 33,
                max_bits: 32
            }
        );
    }

    #[test]
    fn aligned_write_requires_alignment() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        assert!(matches!(
            writer.write_u8(1),
            Err(BitError::Unaligned { bit_position: 1 })
        ));
        writer.align_to_byte();
        writer.write_u16(0x1234).unwrap();
        assert_eq!(writer.finish(), vec![0x80, 0x34, 0x12]);
    }
}

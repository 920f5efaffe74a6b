//! Bit cursor primitives for decoding captured update-object packets.
//!
//! This crate provides [`BitReader`] for decoding and [`BitWriter`] for
//! assembling identifier payloads and test buffers.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **Explicit alignment** - Bit runs and byte reads never interleave silently;
//!   a byte-level read after bit reads fails until the caller flushes with
//!   `align_to_byte()`.
//! - **No domain knowledge** - This crate knows nothing about identifiers or
//!   movement records.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(5, 3).unwrap();
//! writer.align_to_byte();
//! writer.write_u32(42).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(3).unwrap(), 5);
//! reader.align_to_byte();
//! assert_eq!(reader.read_u32().unwrap(), 42);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::{BitReader, MAX_READ_BITS};
pub use writer::BitWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = BitWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = BitReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn multiple_bits_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bit(false);
        writer.write_bit(true);
        writer.write_bit(true);
        writer.write_bit(false);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
    }

    #[test]
    fn bits_roundtrip_various_sizes() {
        let test_cases = [
            (0b1010u32, 4),
            (0xFFu32, 8),
            (0x1FF_FFFFu32, 25),
            (0x1234_5678u32, 32),
            (u32::MAX, 32),
        ];

        for (value, bits) in test_cases {
            let mut writer = BitWriter::new();
            writer.write_bits(value, bits).unwrap();
            let bytes = writer.finish();

            let mut reader = BitReader::new(&bytes);
            let read_value = reader.read_bits(bits).unwrap();
            assert_eq!(
                read_value, value,
                "roundtrip failed for {bits}-bit value {value}"
            );
        }
    }

    #[test]
    fn flag_group_then_aligned_fields() {
        // Shape of a typical record: a run of presence bits, flush, payloads.
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b10, 2).unwrap();
        writer.align_to_byte();
        writer.write_u16(0xBEEF).unwrap();
        writer.write_bit(false);
        writer.align_to_byte();
        writer.write_f32(2.5).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 1 + 2 + 1 + 4);

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(2).unwrap(), 0b10);
        reader.align_to_byte();
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert!(!reader.read_bit().unwrap());
        reader.align_to_byte();
        assert!((reader.read_f32().unwrap() - 2.5).abs() < f32::EPSILON);
        assert!(reader.is_empty());
    }
}

//! Error types for bitstream operations.

use thiserror::Error;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// Fewer bits remain than the read requested.
    #[error("attempted to read {requested} bits but only {available} bits available")]
    OutOfRange {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// A byte-level access was attempted while bits of the current byte are
    /// still pending. Callers must `align_to_byte()` first.
    #[error("byte-aligned access at unaligned bit position {bit_position}")]
    Unaligned {
        /// Absolute bit position at the time of the access.
        bit_position: usize,
    },

    /// Invalid bit count for the operation.
    #[error("invalid bit count {bits}, maximum allowed is {max_bits}")]
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u8,
        /// Maximum allowed bits for this operation.
        max_bits: u8,
    },

    /// Value exceeds the range representable by the specified number of bits.
    #[error("value {value} cannot be represented in {bits} bits")]
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u8,
    },
}

//! Error types for wire format operations.

use bitstream::BitError;
use thiserror::Error;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while decoding wire-level structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WireError {
    /// Underlying cursor failure (out of range or unaligned).
    #[error(transparent)]
    Bit(#[from] BitError),

    /// A presence mask or count declared more data than the buffer holds.
    #[error("truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// The identifier cannot be represented in the requested framing.
    #[error("identifier {guid:#034x} does not fit the {format:?} framing")]
    GuidOutOfRange { guid: u128, format: crate::GuidFormat },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PacketBytes,
    Entries,
    ArrayLength,
    StringLength,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PacketBytes => "packet bytes",
            Self::Entries => "entry count",
            Self::ArrayLength => "array length",
            Self::StringLength => "string length",
        };
        write!(f, "{name}")
    }
}

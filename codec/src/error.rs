//! Error types for codec operations.

use std::fmt;

use bitstream::BitError;
use schema::ObjectType;
use thiserror::Error;
use wire::{Guid, WireError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or applying an update entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Cursor, identifier or limit failure.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A create block set a field the active schema does not know.
    #[error("no {object_type} field covers block {block}")]
    SchemaMismatch { object_type: ObjectType, block: u16 },

    /// The create entry's type byte is outside the known range.
    #[error("unknown object type {raw}")]
    UnknownObjectType { raw: u8 },

    /// An entry discriminant this protocol does not define.
    #[error("unknown update type {raw}")]
    UnknownDiscriminant { raw: u8 },

    /// A values update arrived for an identifier with no prior create.
    #[error("values update for unknown entity {guid}")]
    OrphanUpdate { guid: Guid },
}

impl From<BitError> for CodecError {
    fn from(err: BitError) -> Self {
        Self::Wire(err.into())
    }
}

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    OutOfRange,
    Unaligned,
    Truncated,
    LimitsExceeded,
    UnknownDiscriminant,
    SchemaMismatch,
    OrphanUpdate,
}

impl CodecError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Wire(WireError::Bit(BitError::Unaligned { .. })) => ErrorKind::Unaligned,
            Self::Wire(WireError::Bit(_)) => ErrorKind::OutOfRange,
            Self::Wire(WireError::LimitsExceeded { .. }) => ErrorKind::LimitsExceeded,
            Self::Wire(_) => ErrorKind::Truncated,
            Self::SchemaMismatch { .. } | Self::UnknownObjectType { .. } => {
                ErrorKind::SchemaMismatch
            }
            Self::UnknownDiscriminant { .. } => ErrorKind::UnknownDiscriminant,
            Self::OrphanUpdate { .. } => ErrorKind::OrphanUpdate,
        }
    }
}

/// An error tied to the packet entry that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub opcode: u32,
    pub entry_index: usize,
    pub error: CodecError,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "opcode {:#06x} entry {}: {}",
            self.opcode, self.entry_index, self.error
        )
    }
}

impl std::error::Error for EntryFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::LimitKind;

    #[test]
    fn bit_errors_classify() {
        let short: CodecError = BitError::OutOfRange {
            requested: 32,
            available: 8,
        }
        .into();
        assert_eq!(short.kind(), ErrorKind::OutOfRange);

        let unaligned: CodecError = BitError::Unaligned { bit_position: 3 }.into();
        assert_eq!(unaligned.kind(), ErrorKind::Unaligned);
    }

    #[test]
    fn wire_errors_classify() {
        let truncated = CodecError::Wire(WireError::Truncated {
            what: "guid",
            needed: 4,
            available: 1,
        });
        assert_eq!(truncated.kind(), ErrorKind::Truncated);

        let limits = CodecError::Wire(WireError::LimitsExceeded {
            kind: LimitKind::ArrayLength,
            limit: 4,
            actual: 9,
        });
        assert_eq!(limits.kind(), ErrorKind::LimitsExceeded);
    }

    #[test]
    fn schema_kinds() {
        let unknown_type = CodecError::UnknownObjectType { raw: 12 };
        assert_eq!(unknown_type.kind(), ErrorKind::SchemaMismatch);
        let orphan = CodecError::OrphanUpdate { guid: Guid::EMPTY };
        assert_eq!(orphan.kind(), ErrorKind::OrphanUpdate);
    }

    #[test]
    fn failure_display_carries_context() {
        let failure = EntryFailure {
            opcode: 0x1725,
            entry_index: 3,
            error: CodecError::UnknownObjectType { raw: 42 },
        };
        let msg = failure.to_string();
        assert!(msg.contains("0x1725"));
        assert!(msg.contains("entry 3"));
        assert!(msg.contains("42"));
    }
}

//! Configurable limits for bounded decoding.

use crate::error::{LimitKind, WireError, WireResult};

/// Limits enforced while decoding captured packets.
///
/// Every count read from the wire is validated against these limits and
/// against the bytes left in the buffer before anything is allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum packet size in bytes.
    pub max_packet_bytes: usize,

    /// Maximum number of entries in one update-object packet.
    pub max_entries: usize,

    /// Maximum element count of any counted array.
    pub max_array_len: usize,

    /// Maximum length of an inline string in bytes.
    pub max_string_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Update-object packets are sent compressed and can be large
            max_packet_bytes: 1024 * 1024,
            max_entries: 4096,
            max_array_len: 16 * 1024,
            max_string_len: 4096,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_bytes: 4096,
            max_entries: 32,
            max_array_len: 64,
            max_string_len: 128,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_bytes: usize::MAX,
            max_entries: usize::MAX,
            max_array_len: usize::MAX,
            max_string_len: usize::MAX,
        }
    }

    /// Validates an array count against the limit and the bytes left.
    ///
    /// `min_elem_bytes` is the smallest possible encoding of one element.
    pub fn check_array(
        &self,
        count: u32,
        min_elem_bytes: usize,
        bytes_remaining: usize,
    ) -> WireResult<usize> {
        let count = count as usize;
        if count > self.max_array_len {
            return Err(WireError::LimitsExceeded {
                kind: LimitKind::ArrayLength,
                limit: self.max_array_len,
                actual: count,
            });
        }
        let needed = count.saturating_mul(min_elem_bytes);
        if needed > bytes_remaining {
            return Err(WireError::Truncated {
                what: "array",
                needed,
                available: bytes_remaining,
            });
        }
        Ok(count)
    }

    /// Validates an inline string length.
    pub fn check_string(&self, len: usize, bytes_remaining: usize) -> WireResult<usize> {
        if len > self.max_string_len {
            return Err(WireError::LimitsExceeded {
                kind: LimitKind::StringLength,
                limit: self.max_string_len,
                actual: len,
            });
        }
        if len > bytes_remaining {
            return Err(WireError::Truncated {
                what: "string",
                needed: len,
                available: bytes_remaining,
            });
        }
        Ok(len)
    }
}

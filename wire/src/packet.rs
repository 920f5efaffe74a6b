//! Update-object packet framing: header and per-entry discriminants.

use bitstream::BitReader;
use tracing::trace;

use crate::error::{LimitKind, WireError, WireResult};
use crate::guid::{Guid, GuidCodec};
use crate::limits::Limits;

/// One-byte discriminant preceding every update entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum UpdateType {
    Values = 0,
    CreateObject1 = 1,
    CreateObject2 = 2,
    DestroyObjects = 3,
}

impl UpdateType {
    /// Parses a discriminant; `None` for tags this protocol does not define.
    #[must_use]
    pub const fn parse(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Values),
            1 => Some(Self::CreateObject1),
            2 => Some(Self::CreateObject2),
            3 => Some(Self::DestroyObjects),
            _ => None,
        }
    }
}

/// Objects removed from the client's view, listed ahead of the entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemovedObjects {
    /// How many of the leading identifiers were destroyed outright.
    pub destroy_count: i16,
    pub guids: Vec<Guid>,
}

impl RemovedObjects {
    fn split(&self) -> usize {
        usize::try_from(self.destroy_count)
            .unwrap_or(0)
            .min(self.guids.len())
    }

    /// Identifiers that were destroyed.
    #[must_use]
    pub fn destroyed(&self) -> &[Guid] {
        &self.guids[..self.split()]
    }

    /// Identifiers that merely left the client's range.
    #[must_use]
    pub fn out_of_range(&self) -> &[Guid] {
        &self.guids[self.split()..]
    }
}

/// Fixed prefix of an update-object packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateObjectHeader {
    pub num_updates: u32,
    pub map_id: u16,
    pub removed: Option<RemovedObjects>,
    /// Byte length of the entry data following the header.
    pub data_size: u32,
}

/// Decodes the update-object header, leaving the cursor at the first entry.
pub fn decode_update_header(
    reader: &mut BitReader<'_>,
    guids: &GuidCodec,
    limits: &Limits,
) -> WireResult<UpdateObjectHeader> {
    if reader.len() > limits.max_packet_bytes {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::PacketBytes,
            limit: limits.max_packet_bytes,
            actual: reader.len(),
        });
    }

    let num_updates = reader.read_u32()?;
    if num_updates as usize > limits.max_entries {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::Entries,
            limit: limits.max_entries,
            actual: num_updates as usize,
        });
    }
    let map_id = reader.read_u16()?;

    let has_removed = reader.read_bit()?;
    reader.align_to_byte();

    let removed = if has_removed {
        let destroy_count = reader.read_i16()?;
        let count = reader.read_u32()?;
        let count =
            limits.check_array(count, guids.min_encoded_len(), reader.bytes_remaining())?;
        let mut removed = Vec::with_capacity(count);
        for _ in 0..count {
            removed.push(guids.decode(reader)?);
        }
        Some(RemovedObjects {
            destroy_count,
            guids: removed,
        })
    } else {
        None
    };

    let data_size = reader.read_u32()?;
    trace!(num_updates, map_id, has_removed, data_size, "update-object header");

    Ok(UpdateObjectHeader {
        num_updates,
        map_id,
        removed,
        data_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::HighType;
    use bitstream::{BitError, BitWriter};

    fn header_bytes(removed: Option<(i16, &[Guid])>, data_size: u32) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.write_u32(2).unwrap();
        w.write_u16(530).unwrap();
        w.write_bit(removed.is_some());
        w.align_to_byte();
        if let Some((destroy_count, guids)) = removed {
            w.write_i16(destroy_count).unwrap();
            w.write_u32(guids.len() as u32).unwrap();
            for guid in guids {
                GuidCodec::PACKED128.encode_into(*guid, &mut w).unwrap();
            }
        }
        w.write_u32(data_size).unwrap();
        w.finish()
    }

    #[test]
    fn update_type_parse() {
        assert_eq!(UpdateType::parse(0), Some(UpdateType::Values));
        assert_eq!(UpdateType::parse(2), Some(UpdateType::CreateObject2));
        assert_eq!(UpdateType::parse(3), Some(UpdateType::DestroyObjects));
        assert_eq!(UpdateType::parse(9), None);
    }

    #[test]
    fn header_without_removed_objects() {
        let bytes = header_bytes(None, 77);
        let mut reader = BitReader::new(&bytes);
        let header =
            decode_update_header(&mut reader, &GuidCodec::PACKED128, &Limits::for_testing())
                .unwrap();
        assert_eq!(header.num_updates, 2);
        assert_eq!(header.map_id, 530);
        assert_eq!(header.removed, None);
        assert_eq!(header.data_size, 77);
        assert!(reader.is_empty());
    }

    #[test]
    fn header_with_removed_objects_splits_destroyed() {
        let a = Guid::compose(HighType::Creature, 0, 1, 1);
        let b = Guid::compose(HighType::Creature, 0, 1, 2);
        let c = Guid::compose(HighType::GameObject, 0, 5, 3);
        let bytes = header_bytes(Some((1, &[a, b, c][..])), 0);
        let mut reader = BitReader::new(&bytes);
        let header =
            decode_update_header(&mut reader, &GuidCodec::PACKED128, &Limits::for_testing())
                .unwrap();
        let removed = header.removed.unwrap();
        assert_eq!(removed.destroyed(), &[a]);
        assert_eq!(removed.out_of_range(), &[b, c]);
    }

    #[test]
    fn negative_destroy_count_destroys_nothing() {
        let removed = RemovedObjects {
            destroy_count: -4,
            guids: vec![Guid::new(1, 0)],
        };
        assert!(removed.destroyed().is_empty());
        assert_eq!(removed.out_of_range().len(), 1);
    }

    #[test]
    fn empty_packed64_removed_objects_fill_the_buffer() {
        let mut w = BitWriter::new();
        w.write_u32(0).unwrap();
        w.write_u16(1).unwrap();
        w.write_bit(true);
        w.align_to_byte();
        w.write_i16(0).unwrap();
        w.write_u32(6).unwrap();
        // six one-byte identifiers, then a data size taking four more
        for _ in 0..6 {
            GuidCodec::PACKED64.encode_into(Guid::EMPTY, &mut w).unwrap();
        }
        w.write_u32(0).unwrap();
        let bytes = w.finish();

        let mut reader = BitReader::new(&bytes);
        let header =
            decode_update_header(&mut reader, &GuidCodec::PACKED64, &Limits::for_testing())
                .unwrap();
        let removed = header.removed.unwrap();
        assert_eq!(removed.guids, vec![Guid::EMPTY; 6]);
        assert!(reader.is_empty());
    }

    #[test]
    fn too_many_entries_rejected() {
        let mut w = BitWriter::new();
        w.write_u32(10_000).unwrap();
        let bytes = w.finish();
        let err = decode_update_header(
            &mut BitReader::new(&bytes),
            &GuidCodec::PACKED128,
            &Limits::for_testing(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitsExceeded {
                kind: LimitKind::Entries,
                ..
            }
        ));
    }

    #[test]
    fn short_header_is_out_of_range() {
        let err = decode_update_header(
            &mut BitReader::new(&[1, 0, 0]),
            &GuidCodec::PACKED128,
            &Limits::for_testing(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WireError::Bit(BitError::OutOfRange { .. })
        ));
    }
}

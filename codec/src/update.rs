//! Decoding of whole update-object packets.
//!
//! Decoding is pure: it reads a [`RawPacket`] against a layout and a schema
//! and returns an [`UpdateObject`] without touching any store. Entries are
//! decoded in order; the first entry that fails ends the packet, and the
//! entries before it are kept.

use schema::{FieldSchema, ObjectType};
use tracing::{debug, warn};
use wire::{decode_update_header, Guid, Limits, UpdateObjectHeader, UpdateType};

use bitstream::BitReader;

use crate::error::{CodecError, CodecResult, EntryFailure};
use crate::layout::ProtocolLayout;
use crate::movement::{decode_movement, MovementRecord};
use crate::reader::EntryReader;
use crate::trace::{FieldEvent, FieldTrace};
use crate::types::{object_type_of, RawPacket};
use crate::values::{decode_values, FieldUpdateSet, UpdateMode};

/// One operation of an update-object packet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateEntry {
    /// A partial field update for an existing entity.
    Values { guid: Guid, updates: FieldUpdateSet },
    /// A full create, or a re-create of a known entity.
    Create(Box<CreateObject>),
    /// Identifiers that left the client's view.
    Destroy { guids: Vec<Guid> },
    /// A discriminant this protocol does not define.
    Unknown { raw: u8 },
}

impl UpdateEntry {
    /// Short name of the variant, for logs and summaries.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Values { .. } => "values",
            Self::Create(_) => "create",
            Self::Destroy { .. } => "destroy",
            Self::Unknown { .. } => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateObject {
    /// `CreateObject1` or `CreateObject2`; both decode the same way.
    pub kind: UpdateType,
    pub guid: Guid,
    pub object_type: ObjectType,
    pub movement: MovementRecord,
    pub fields: FieldUpdateSet,
}

/// A decoded entry with the field events recorded while reading it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedEntry {
    pub index: usize,
    pub entry: UpdateEntry,
    pub trace: Vec<FieldEvent>,
}

/// The decoded form of one update-object packet.
#[derive(Debug, Clone)]
pub struct UpdateObject {
    pub opcode: u32,
    pub header: UpdateObjectHeader,
    /// Entries that decoded completely, in wire order.
    pub entries: Vec<DecodedEntry>,
    /// Non-fatal problems: unknown discriminants and skipped blocks.
    pub warnings: Vec<EntryFailure>,
    /// The entry that aborted decoding, if any.
    pub failure: Option<EntryFailure>,
    /// Bytes consumed by the entries.
    pub entry_bytes: usize,
    /// Bytes left in the buffer after the last entry.
    pub trailing_bytes: usize,
}

impl UpdateObject {
    /// Returns `true` if every entry decoded and consumed exactly the
    /// declared data size.
    #[must_use]
    pub fn is_exhaustive(&self) -> bool {
        self.failure.is_none()
            && self.trailing_bytes == 0
            && self.entry_bytes == self.header.data_size as usize
    }
}

/// Decodes update-object packets for one layout and schema.
#[derive(Clone, Copy)]
pub struct UpdateDecoder<'s> {
    layout: &'s ProtocolLayout,
    schema: &'s dyn FieldSchema,
    limits: &'s Limits,
    trace: bool,
}

impl<'s> UpdateDecoder<'s> {
    #[must_use]
    pub fn new(
        layout: &'s ProtocolLayout,
        schema: &'s dyn FieldSchema,
        limits: &'s Limits,
    ) -> Self {
        Self {
            layout,
            schema,
            limits,
            trace: false,
        }
    }

    /// Records field events for every entry.
    #[must_use]
    pub const fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Decodes a packet.
    ///
    /// Only a malformed header is an error; entry failures are reported in
    /// the returned [`UpdateObject`].
    pub fn decode(&self, packet: &RawPacket) -> CodecResult<UpdateObject> {
        let mut bits = BitReader::new(&packet.data);
        let header = decode_update_header(&mut bits, &self.layout.guids, self.limits)?;
        let start = bits.byte_position();

        // every entry needs at least one byte
        let capacity = (header.num_updates as usize).min(bits.bytes_remaining());
        let mut entries = Vec::with_capacity(capacity);
        let mut warnings = Vec::new();
        let mut failure = None;

        for index in 0..header.num_updates as usize {
            let mut trace = FieldTrace::new(self.trace);
            trace.push_index(index);
            let result = {
                let mut r =
                    EntryReader::new(&mut bits, &mut trace, self.limits, self.layout.guids);
                self.decode_entry(&mut r)
            };

            let entry = match result {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(
                        opcode = packet.opcode,
                        entry = index,
                        %error,
                        "malformed entry, rest of packet dropped"
                    );
                    failure = Some(EntryFailure {
                        opcode: packet.opcode,
                        entry_index: index,
                        error,
                    });
                    break;
                }
            };

            match &entry {
                UpdateEntry::Unknown { raw } => {
                    warn!(opcode = packet.opcode, entry = index, raw, "unknown update type");
                    warnings.push(EntryFailure {
                        opcode: packet.opcode,
                        entry_index: index,
                        error: CodecError::UnknownDiscriminant { raw: *raw },
                    });
                }
                UpdateEntry::Values { guid, updates } => {
                    let object_type = object_type_of(*guid);
                    warnings.extend(updates.skipped().iter().map(|block| EntryFailure {
                        opcode: packet.opcode,
                        entry_index: index,
                        error: CodecError::SchemaMismatch {
                            object_type,
                            block: *block,
                        },
                    }));
                }
                UpdateEntry::Create(_) | UpdateEntry::Destroy { .. } => {}
            }

            debug!(entry = index, kind = entry.kind(), "decoded entry");
            entries.push(DecodedEntry {
                index,
                entry,
                trace: trace.take(),
            });
        }

        bits.align_to_byte();
        let entry_bytes = bits.byte_position() - start;
        let trailing_bytes = bits.bytes_remaining();
        if failure.is_none() && (trailing_bytes != 0 || entry_bytes != header.data_size as usize) {
            warn!(
                opcode = packet.opcode,
                data_size = header.data_size,
                entry_bytes,
                trailing_bytes,
                "entry data does not match declared size"
            );
        }

        Ok(UpdateObject {
            opcode: packet.opcode,
            header,
            entries,
            warnings,
            failure,
            entry_bytes,
            trailing_bytes,
        })
    }

    fn decode_entry(&self, r: &mut EntryReader<'_, '_>) -> CodecResult<UpdateEntry> {
        let raw = r.u8("UpdateType")?;
        let Some(kind) = UpdateType::parse(raw) else {
            return Ok(UpdateEntry::Unknown { raw });
        };

        match kind {
            UpdateType::Values => {
                let guid = r.guid("GUID")?;
                let updates =
                    decode_values(r, self.schema, object_type_of(guid), UpdateMode::Values)?;
                Ok(UpdateEntry::Values { guid, updates })
            }
            UpdateType::CreateObject1 | UpdateType::CreateObject2 => {
                let guid = r.guid("GUID")?;
                let type_raw = r.u8("Object Type")?;
                let object_type = ObjectType::from_raw(type_raw)
                    .ok_or(CodecError::UnknownObjectType { raw: type_raw })?;
                let movement = decode_movement(r, self.layout)?;
                let fields = decode_values(r, self.schema, object_type, UpdateMode::Create)?;
                Ok(UpdateEntry::Create(Box::new(CreateObject {
                    kind,
                    guid,
                    object_type,
                    movement,
                    fields,
                })))
            }
            UpdateType::DestroyObjects => {
                let count = r.u32("Count")?;
                let count = r.check_count(count, r.guids.min_encoded_len())?;
                let guids = r.array(count, |r| r.guid("Object GUID"))?;
                Ok(UpdateEntry::Destroy { guids })
            }
        }
    }
}

/// Decodes one update-object packet without recording field events.
pub fn decode_update_object(
    packet: &RawPacket,
    layout: &ProtocolLayout,
    schema: &dyn FieldSchema,
    limits: &Limits,
) -> CodecResult<UpdateObject> {
    UpdateDecoder::new(layout, schema, limits).decode(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::layout::V6_0_2;
    use crate::types::CaptureTime;
    use bitstream::BitWriter;
    use wire::{GuidCodec, HighType};

    fn packet(entries: u32, body: &[u8]) -> RawPacket {
        let mut w = BitWriter::new();
        w.write_u32(entries).unwrap();
        w.write_u16(1).unwrap();
        w.write_bit(false);
        w.align_to_byte();
        w.write_u32(body.len() as u32).unwrap();
        w.write_bytes(body).unwrap();
        RawPacket::new(0x1725, CaptureTime::from_millis(0), w.finish())
    }

    fn destroy_body(w: &mut BitWriter, guids: &[Guid]) {
        w.write_u8(UpdateType::DestroyObjects as u8).unwrap();
        w.write_u32(guids.len() as u32).unwrap();
        for guid in guids {
            GuidCodec::PACKED128.encode_into(*guid, w).unwrap();
        }
    }

    fn decode(packet: &RawPacket) -> UpdateObject {
        let schema = schema::v6_0_2();
        let limits = Limits::for_testing();
        UpdateDecoder::new(&V6_0_2, &schema, &limits)
            .with_trace(true)
            .decode(packet)
            .unwrap()
    }

    #[test]
    fn destroy_entry_lists_guids() {
        let a = Guid::compose(HighType::Creature, 1, 3_100, 1);
        let b = Guid::compose(HighType::GameObject, 1, 180_000, 2);
        let mut w = BitWriter::new();
        destroy_body(&mut w, &[a, b]);
        let decoded = decode(&packet(1, &w.finish()));

        assert!(decoded.is_exhaustive());
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(
            decoded.entries[0].entry,
            UpdateEntry::Destroy { guids: vec![a, b] }
        );
        assert!(decoded.entries[0].trace.iter().all(|e| e.path[0] == 0));
    }

    #[test]
    fn unknown_discriminant_is_a_warning() {
        let guid = Guid::compose(HighType::Player, 0, 0, 5);
        let mut w = BitWriter::new();
        w.write_u8(9).unwrap();
        destroy_body(&mut w, &[guid]);
        let decoded = decode(&packet(2, &w.finish()));

        assert!(decoded.failure.is_none());
        assert_eq!(decoded.entries[0].entry, UpdateEntry::Unknown { raw: 9 });
        assert_eq!(decoded.entries[1].entry.kind(), "destroy");
        assert_eq!(decoded.warnings.len(), 1);
        assert_eq!(decoded.warnings[0].entry_index, 0);
        assert_eq!(decoded.warnings[0].error.kind(), ErrorKind::UnknownDiscriminant);
    }

    #[test]
    fn failing_entry_keeps_earlier_entries() {
        let guid = Guid::compose(HighType::Player, 0, 0, 5);
        let mut w = BitWriter::new();
        destroy_body(&mut w, &[guid]);
        w.write_u8(UpdateType::DestroyObjects as u8).unwrap();
        w.write_u32(3).unwrap();
        let decoded = decode(&packet(2, &w.finish()));

        assert_eq!(decoded.entries.len(), 1);
        let failure = decoded.failure.as_ref().unwrap();
        assert_eq!(failure.entry_index, 1);
        assert_eq!(failure.opcode, 0x1725);
        assert!(!decoded.is_exhaustive());
    }

    #[test]
    fn unknown_object_type_fails_the_create() {
        let guid = Guid::compose(HighType::Creature, 1, 3_100, 1);
        let mut w = BitWriter::new();
        w.write_u8(UpdateType::CreateObject2 as u8).unwrap();
        GuidCodec::PACKED128.encode_into(guid, &mut w).unwrap();
        w.write_u8(42).unwrap();
        let decoded = decode(&packet(1, &w.finish()));

        let failure = decoded.failure.unwrap();
        assert_eq!(failure.error, CodecError::UnknownObjectType { raw: 42 });
        assert!(decoded.entries.is_empty());
    }

    #[test]
    fn trailing_bytes_are_reported() {
        let mut w = BitWriter::new();
        destroy_body(&mut w, &[]);
        w.write_u8(0xAA).unwrap();
        let decoded = decode(&packet(1, &w.finish()));

        assert!(decoded.failure.is_none());
        assert_eq!(decoded.trailing_bytes, 1);
        assert!(!decoded.is_exhaustive());
    }

    #[test]
    fn huge_entry_count_fails_at_first_entry() {
        let schema = schema::v6_0_2();
        let limits = Limits::unlimited();
        let packet = packet(u32::MAX, &[]);
        let decoded = decode_update_object(&packet, &V6_0_2, &schema, &limits).unwrap();

        assert!(decoded.entries.is_empty());
        let failure = decoded.failure.unwrap();
        assert_eq!(failure.entry_index, 0);
        assert_eq!(failure.error.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn truncated_header_is_an_error() {
        let schema = schema::v6_0_2();
        let limits = Limits::for_testing();
        let packet = RawPacket::new(0x1725, CaptureTime::default(), vec![1, 0]);
        let result = decode_update_object(&packet, &V6_0_2, &schema, &limits);
        assert!(result.is_err());
    }
}

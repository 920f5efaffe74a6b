//! Test-side encoder for update-object packets.
#![allow(dead_code)]

use bitstream::BitWriter;
use codec::{CaptureTime, CreateGate, RawPacket, V6_0_2};
use schema::ObjectType;
use wire::{Guid, GuidCodec, UpdateType};

pub const OPCODE: u32 = 0x1725;

pub fn guid(w: &mut BitWriter, guid: Guid) {
    GuidCodec::PACKED128.encode_into(guid, w).unwrap();
}

pub fn f32s(w: &mut BitWriter, values: &[f32]) {
    for v in values {
        w.write_f32(*v).unwrap();
    }
}

/// Writes the create presence bits followed by the pause-time count.
pub fn gates(w: &mut BitWriter, set: &[CreateGate], pause_times: u32) {
    w.align_to_byte();
    for gate in V6_0_2.create_gates {
        w.write_bit(set.contains(gate));
    }
    w.align_to_byte();
    w.write_u32(pause_times).unwrap();
}

/// A movement block holding only a stationary position.
pub fn stationary(x: f32, y: f32, z: f32, o: f32) -> impl FnOnce(&mut BitWriter) {
    move |w| {
        gates(w, &[CreateGate::Stationary], 0);
        f32s(w, &[x, y, z, o]);
    }
}

/// Writes a value section for `(block, raw)` pairs plus an empty dynamic
/// section.
pub fn fields(w: &mut BitWriter, blocks: &[(u16, u32)]) {
    let mut sorted = blocks.to_vec();
    sorted.sort_by_key(|(block, _)| *block);

    let words = sorted
        .last()
        .map_or(0, |(block, _)| usize::from(*block) / 32 + 1);
    let mut mask = vec![0u32; words];
    for (block, _) in &sorted {
        mask[usize::from(*block) / 32] |= 1 << (block % 32);
    }

    w.write_u8(words as u8).unwrap();
    for word in mask {
        w.write_u32(word).unwrap();
    }
    for (_, raw) in sorted {
        w.write_u32(raw).unwrap();
    }
    w.write_u8(0).unwrap();
}

/// Builds the entry section of an update-object packet.
pub struct PacketBuilder {
    map_id: u16,
    removed: Option<(i16, Vec<Guid>)>,
    entries: u32,
    body: BitWriter,
}

impl PacketBuilder {
    pub fn new(map_id: u16) -> Self {
        Self {
            map_id,
            removed: None,
            entries: 0,
            body: BitWriter::new(),
        }
    }

    pub fn removed(&mut self, destroy_count: i16, guids: &[Guid]) -> &mut Self {
        self.removed = Some((destroy_count, guids.to_vec()));
        self
    }

    pub fn values(&mut self, id: Guid, blocks: &[(u16, u32)]) -> &mut Self {
        self.entries += 1;
        self.body.write_u8(UpdateType::Values as u8).unwrap();
        guid(&mut self.body, id);
        fields(&mut self.body, blocks);
        self
    }

    pub fn create(
        &mut self,
        id: Guid,
        object_type: ObjectType,
        movement: impl FnOnce(&mut BitWriter),
        blocks: &[(u16, u32)],
    ) -> &mut Self {
        self.entries += 1;
        self.body.write_u8(UpdateType::CreateObject2 as u8).unwrap();
        guid(&mut self.body, id);
        self.body.write_u8(object_type.raw()).unwrap();
        movement(&mut self.body);
        fields(&mut self.body, blocks);
        self
    }

    pub fn destroy(&mut self, guids: &[Guid]) -> &mut Self {
        self.entries += 1;
        self.body.write_u8(UpdateType::DestroyObjects as u8).unwrap();
        self.body.write_u32(guids.len() as u32).unwrap();
        for id in guids {
            guid(&mut self.body, *id);
        }
        self
    }

    /// An entry written by hand; it still counts towards the header.
    pub fn raw(&mut self, write: impl FnOnce(&mut BitWriter)) -> &mut Self {
        self.entries += 1;
        write(&mut self.body);
        self
    }

    pub fn build(self, millis: u64) -> RawPacket {
        let body = self.body.finish();

        let mut w = BitWriter::new();
        w.write_u32(self.entries).unwrap();
        w.write_u16(self.map_id).unwrap();
        w.write_bit(self.removed.is_some());
        w.align_to_byte();
        if let Some((destroy_count, guids)) = &self.removed {
            w.write_i16(*destroy_count).unwrap();
            w.write_u32(guids.len() as u32).unwrap();
            for id in guids {
                guid(&mut w, *id);
            }
        }
        w.write_u32(body.len() as u32).unwrap();
        w.write_bytes(&body).unwrap();

        RawPacket::new(OPCODE, CaptureTime::from_millis(millis), w.finish())
    }
}
